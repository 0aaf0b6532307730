//! Wire Messages
//!
//! JSON text frames exchanged with clients. Inbound messages carry their kind
//! in `message_type` or `type`, the first string wins; outbound messages are
//! either typed events or plain `{status, message}` acknowledgments.

use crate::detection::types::Detection;
use crate::gesture::matcher::TemplateSpec;
use crate::gesture::trajectory::{deserialize_points, Point};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Seconds since the Unix epoch, with sub-second precision
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Why an inbound frame could not be turned into a message
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Message must be a JSON object")]
    NotAnObject,

    #[error("Message is missing a type field")]
    MissingType,

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Invalid {kind} message: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// `recognize_gesture` payload
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecognizeGesture {
    #[serde(default, deserialize_with = "deserialize_points")]
    pub trajectory: Vec<Point>,
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
    #[serde(default)]
    pub templates: Vec<TemplateSpec>,
}

/// `update_confidence` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateConfidence {
    #[serde(default)]
    pub hand_detection_confidence: Option<f64>,
    #[serde(default)]
    pub gesture_recognition_confidence: Option<f64>,
}

/// `frame` payload; the image may arrive under `frame` or `data`.
///
/// Fields accept any JSON value so a mistyped frame is still acknowledged;
/// only non-empty strings count as image data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FramePayload {
    #[serde(default)]
    pub frame: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl FramePayload {
    /// Encoded image, if any was sent
    pub fn image_data(&self) -> Option<&str> {
        fn text(field: &Option<Value>) -> Option<&str> {
            field.as_ref().and_then(Value::as_str).filter(|s| !s.is_empty())
        }
        text(&self.frame).or_else(|| text(&self.data))
    }
}

/// `refresh_detection` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshDetection {
    #[serde(default)]
    pub force_process: bool,
}

/// Client-to-server message
#[derive(Debug, Clone)]
pub enum InboundMessage {
    Ping,
    StartTracking,
    StopTracking,
    SaveTemplate,
    RecognizeGesture(RecognizeGesture),
    UpdateConfidence(UpdateConfidence),
    Frame(FramePayload),
    RefreshDetection(RefreshDetection),
}

impl InboundMessage {
    /// Parse a text frame
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(text).map_err(ParseError::InvalidJson)?;
        if !value.is_object() {
            return Err(ParseError::NotAnObject);
        }

        let kind = ["message_type", "type"]
            .iter()
            .find_map(|field| value.get(*field).and_then(Value::as_str))
            .ok_or(ParseError::MissingType)?
            .to_string();

        let message = match kind.as_str() {
            "ping" => Self::Ping,
            "start_tracking" => Self::StartTracking,
            "stop_tracking" => Self::StopTracking,
            "save_template" => Self::SaveTemplate,
            "recognize_gesture" => Self::RecognizeGesture(payload(&kind, value)?),
            "update_confidence" => Self::UpdateConfidence(payload(&kind, value)?),
            "frame" => Self::Frame(payload(&kind, value)?),
            "refresh_detection" => Self::RefreshDetection(payload(&kind, value)?),
            _ => return Err(ParseError::UnknownType(kind)),
        };
        Ok(message)
    }

    /// Wire name of the message kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::StartTracking => "start_tracking",
            Self::StopTracking => "stop_tracking",
            Self::SaveTemplate => "save_template",
            Self::RecognizeGesture(_) => "recognize_gesture",
            Self::UpdateConfidence(_) => "update_confidence",
            Self::Frame(_) => "frame",
            Self::RefreshDetection(_) => "refresh_detection",
        }
    }
}

fn payload<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|source| ParseError::InvalidPayload {
        kind: kind.to_string(),
        source,
    })
}

/// Typed server events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionEstablished {
        message: String,
        current_hand_confidence: f64,
        current_gesture_confidence: f64,
    },
    Pong {
        timestamp: f64,
    },
    Info {
        message: String,
    },
    GestureRecognized {
        template_name: String,
        similarity: f64,
        command: String,
    },
    GestureNotRecognized {
        message: String,
    },
    FrameReceived,
    Detection {
        detection: Option<Detection>,
        timestamp: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    ConfidenceUpdated {
        hand_detection_confidence: f64,
        gesture_recognition_confidence: f64,
    },
    Error {
        message: String,
    },
}

/// Outcome of a status acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Success,
    Error,
}

/// `{status, message}` acknowledgment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusAck {
    pub status: AckStatus,
    pub message: String,
}

/// Server-to-client message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Event(ServerEvent),
    Status(StatusAck),
}

impl OutboundMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Status(StatusAck {
            status: AckStatus::Success,
            message: message.into(),
        })
    }

    pub fn status_error(message: impl Into<String>) -> Self {
        Self::Status(StatusAck {
            status: AckStatus::Error,
            message: message.into(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Event(ServerEvent::Error {
            message: message.into(),
        })
    }

    pub fn detection(detection: Option<Detection>, source: Option<&str>) -> Self {
        Self::Event(ServerEvent::Detection {
            detection,
            timestamp: unix_timestamp(),
            source: source.map(str::to_string),
        })
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<ServerEvent> for OutboundMessage {
    fn from(event: ServerEvent) -> Self {
        Self::Event(event)
    }
}
