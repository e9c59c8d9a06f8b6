pub mod interface;
pub mod impl_fake;
pub mod impl_rten;

pub use interface::{BinaryClassifier, Classifier, ClassifierVerdict, MAX_VERDICT_LEN};
pub use impl_fake::{FailingClassifier, FakeBinaryClassifier, FakeClassifier};
pub use impl_rten::{RtenBinaryClassifier, RtenClassifier};
