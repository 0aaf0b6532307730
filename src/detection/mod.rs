//! Hand detection
//!
//! Decodes streamed frames, runs the hand detector at a reduced resolution,
//! and tracks the latest detection together with rolling throughput stats.

pub mod types;
pub mod codec;
pub mod detector;
pub mod latency;
pub mod pipeline;

pub use types::{Detection, Prediction};
pub use detector::{build_detector, DetectorError, HandDetector, RoboflowDetector};
pub use latency::{LatencyWindow, ThroughputReport};
pub use pipeline::{DetectionPipeline, HealthReport, PipelineSettings, PipelineStats};
