//! Hand Detector Capability
//!
//! The detection model is a black box behind [`HandDetector`]: given an image
//! and a confidence threshold it returns zero or more scored boxes in the
//! image's own coordinates. Failures come back as [`DetectorError`] so the
//! pipeline has to decide what a failed inference means for the frame.
//!
//! [`RoboflowDetector`] talks to a hosted Roboflow model over HTTP.

use super::types::Prediction;
use crate::app::config::DetectionConfig;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Errors raised by a detector backend
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("inference service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to encode inference image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("malformed inference response: {0}")]
    Malformed(String),
}

/// Bounding-box hand detector
pub trait HandDetector: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &str;

    /// Whether the backend can serve requests
    fn is_ready(&self) -> bool {
        true
    }

    /// Run inference. Coordinates are relative to `image`.
    fn infer(&self, image: &DynamicImage, confidence: f64) -> Result<Vec<Prediction>, DetectorError>;
}

/// Response body of the hosted inference API
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// Detector backed by the hosted Roboflow inference API
pub struct RoboflowDetector {
    client: reqwest::blocking::Client,
    endpoint: String,
    model_id: String,
    api_key: String,
}

impl RoboflowDetector {
    /// Create a detector for `config.model_id`.
    ///
    /// Must be called outside an async context: the blocking client owns its
    /// own runtime.
    pub fn new(config: &DetectionConfig, api_key: impl Into<String>) -> Result<Self, DetectorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            model_id: config.model_id.trim_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn model_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model_id)
    }

    /// The hosted API takes confidence as an integer percentage
    fn confidence_param(confidence: f64) -> String {
        format!("{}", (confidence.clamp(0.0, 1.0) * 100.0).round() as u32)
    }

    fn parse_response(body: &str) -> Result<Vec<Prediction>, DetectorError> {
        serde_json::from_str::<InferenceResponse>(body)
            .map(|r| r.predictions)
            .map_err(|e| DetectorError::Malformed(e.to_string()))
    }
}

impl HandDetector for RoboflowDetector {
    fn name(&self) -> &str {
        &self.model_id
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn infer(&self, image: &DynamicImage, confidence: f64) -> Result<Vec<Prediction>, DetectorError> {
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;
        let body = base64::engine::general_purpose::STANDARD.encode(&jpeg);

        let response = self
            .client
            .post(self.model_url())
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("confidence", Self::confidence_param(confidence).as_str()),
                ("format", "json"),
            ])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DetectorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_response(&response.text()?)
    }
}

/// Build the configured detector, if any.
///
/// Without an API key the server still runs; frames simply never produce
/// detections and health reports the model as not loaded.
pub fn build_detector(config: &DetectionConfig) -> crate::Result<Option<Arc<dyn HandDetector>>> {
    match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            let detector = RoboflowDetector::new(config, key)?;
            info!("Inference model configured: {}", config.model_id);
            Ok(Some(Arc::new(detector)))
        }
        None => {
            warn!("ROBOFLOW_API_KEY not set; hand detection disabled");
            Ok(None)
        }
    }
}
