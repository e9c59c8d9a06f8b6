use serde::Serialize;

/// Outer silhouette of the dominant wood-colored blob
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: f64,
}

impl Region {
    /// Inclusive corners in any order; `area` is the area enclosed by the outer border
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32, area: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
            area: area.max(0.0),
        }
    }

    pub fn x(&self) -> u32 {
        self.min_x
    }

    pub fn y(&self) -> u32 {
        self.min_y
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Area enclosed by the outer contour, holes included
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn bbox_area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Share of the bounding box covered by the region, in [0, 1]
    pub fn fill_ratio(&self) -> f64 {
        (self.area / self.bbox_area() as f64).min(1.0)
    }
}

/// Lumber quality grade derived from silhouette regularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityGrade {
    GradeC,
    GradeB,
    GradeA,
    Premium,
}

impl QualityGrade {
    pub fn score(&self) -> u8 {
        match self {
            QualityGrade::Premium => 90,
            QualityGrade::GradeA => 80,
            QualityGrade::GradeB => 70,
            QualityGrade::GradeC => 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::Premium => "Premium",
            QualityGrade::GradeA => "Grade A",
            QualityGrade::GradeB => "Grade B",
            QualityGrade::GradeC => "Grade C",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub height_m: f64,
    pub width_cm: u32,
    pub volume_cubic_m: f64,
    pub board_feet: u32,
    pub quality: QualityGrade,
    pub fill_ratio: f64,
}

impl Measurement {
    /// Trunk diameter in centimeters (the silhouette width)
    pub fn diameter_cm(&self) -> u32 {
        self.width_cm
    }

    pub fn quality_score(&self) -> u8 {
        self.quality.score()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedClass {
    Human,
    Cocolumber,
    NotCocolumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    CustomModel,
    Mobilenet,
    HsvHeuristic,
    None,
}

/// One (label, score) pair as produced by a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Final verdict of one scan
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub detected_class: DetectedClass,
    pub confidence: u8,
    pub measurement: Option<Measurement>,
    pub detection_method: DetectionMethod,
    pub raw_predictions: Vec<Classification>,
    pub message: Option<String>,
}
