pub mod preprocessing;
pub mod color;
pub mod segmentation;
pub mod measurement;
pub mod heuristic;
pub mod fusion;

pub use fusion::{fuse, FusionInputs};
pub use heuristic::HeuristicReport;
pub use preprocessing::{NormalizedImage, TensorLayout};
pub use segmentation::{segment, ColorMask, Segmentation};
