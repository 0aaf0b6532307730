//! # AirCut Server
//!
//! Backend for air-drawn gesture shortcuts: recognizes hand-drawn 2D
//! trajectories against caller-supplied templates and streams live hand
//! detections for webcam frames over WebSocket.
//!
//! ## Quick Start
//!
//! ```no_run
//! use aircut_server::gesture::{GestureMatcher, Point, Template};
//!
//! let l_shape = [Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0)];
//! let templates = vec![Template::new("t0", "L", &l_shape).with_command("copy")];
//!
//! let drawn = [Point::new(10.0, 10.0), Point::new(10.0, 60.0), Point::new(60.0, 60.0)];
//! let matcher = GestureMatcher::new();
//! if let Some(found) = matcher.recognize(&drawn, &templates, 0.85) {
//!     println!("{} ({:.2})", found.name, found.similarity);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`gesture`]: Trajectory normalization, resampling and template matching
//! - [`detection`]: Frame decoding, the hand detector capability and the
//!   shared detection pipeline
//! - [`session`]: Wire messages and the per-connection protocol handler
//! - [`server`]: HTTP health route and WebSocket endpoints
//! - [`app`]: CLI and configuration management
//!
//! ## Message Flow
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  WebSocket  │───▶│   Session   │───▶│   Gesture   │
//! │   client    │    │   Handler   │    │   Matcher   │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                  │
//!        │                  ▼
//!        │           ┌─────────────┐    ┌─────────────┐
//!        └───────────│  Detection  │───▶│    Hand     │
//!                    │  Pipeline   │    │  Detector   │
//!                    └─────────────┘    └─────────────┘
//! ```

pub mod app;
pub mod detection;
pub mod gesture;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use detection::{Detection, DetectionPipeline, HandDetector, Prediction};
pub use gesture::{GestureMatch, GestureMatcher, Point, Template};
pub use session::{AppContext, SessionHandler};

/// Result type alias for the server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Frame decode error: {0}")]
    Decode(String),

    #[error("Detector error: {0}")]
    Detector(#[from] detection::detector::DetectorError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] session::messages::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
