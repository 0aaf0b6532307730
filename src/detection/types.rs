//! Detection data types

use serde::{Deserialize, Serialize};

/// Class label used when the detector does not report one
pub const DEFAULT_CLASS: &str = "hand";

fn default_class() -> String {
    DEFAULT_CLASS.to_string()
}

/// Raw detector output in inference-resolution coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Box center x
    pub x: f64,
    /// Box center y
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    #[serde(rename = "class", default = "default_class")]
    pub class_name: String,
}

impl Prediction {
    pub fn new(x: f64, y: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            class_name: default_class(),
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Map the box into original-image pixels
    pub fn rescale(&self, scale_x: f64, scale_y: f64) -> Detection {
        Detection {
            x: self.x * scale_x,
            y: self.y * scale_y,
            width: self.width * scale_x,
            height: self.height * scale_y,
            confidence: self.confidence,
            class_name: self.class_name.clone(),
        }
    }
}

/// Hand detection in original-image pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Box center x
    pub x: f64,
    /// Box center y
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    #[serde(rename = "class")]
    pub class_name: String,
}

/// Select the highest-confidence prediction; the earliest wins ties
pub fn best_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    predictions
        .iter()
        .reduce(|best, p| if p.confidence > best.confidence { p } else { best })
}
