//! Shared Application Context
//!
//! One instance per process, handed to every connection. Holds the detection
//! pipeline, the runtime-tunable confidence thresholds, and the defaults new
//! sessions start from.

use crate::app::config::Config;
use crate::detection::detector::HandDetector;
use crate::detection::pipeline::{DetectionPipeline, PipelineSettings};
use crate::gesture::matcher::GestureMatcher;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Process-wide confidence thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub hand_detection: f64,
    pub gesture_recognition: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hand_detection: 0.75,
            gesture_recognition: 0.85,
        }
    }
}

/// Starting frame-skip policy for new sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Run detection on every Nth frame
    pub frame_stride: u32,
    /// Stride after a forced refresh
    pub forced_frame_stride: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            frame_stride: 2,
            forced_frame_stride: 1,
        }
    }
}

/// State shared by every connection
pub struct AppContext {
    pipeline: DetectionPipeline,
    thresholds: RwLock<Thresholds>,
    matcher: GestureMatcher,
    session: SessionSettings,
}

impl AppContext {
    pub fn new(
        pipeline: DetectionPipeline,
        thresholds: Thresholds,
        matcher: GestureMatcher,
        session: SessionSettings,
    ) -> Self {
        Self {
            pipeline,
            thresholds: RwLock::new(thresholds),
            matcher,
            session: SessionSettings {
                frame_stride: session.frame_stride.max(1),
                forced_frame_stride: session.forced_frame_stride.max(1),
            },
        }
    }

    /// Build the context described by `config`
    pub fn from_config(config: &Config, detector: Option<Arc<dyn HandDetector>>) -> Self {
        Self::new(
            DetectionPipeline::new(detector, PipelineSettings::from(&config.detection)),
            Thresholds {
                hand_detection: config.detection.hand_confidence,
                gesture_recognition: config.gesture.recognition_confidence,
            },
            GestureMatcher::with_max_points(config.gesture.max_resample_points),
            SessionSettings {
                frame_stride: config.session.frame_stride,
                forced_frame_stride: config.session.forced_frame_stride,
            },
        )
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    pub fn matcher(&self) -> &GestureMatcher {
        &self.matcher
    }

    pub fn session_settings(&self) -> SessionSettings {
        self.session
    }

    /// Current thresholds
    pub fn thresholds(&self) -> Thresholds {
        *self.thresholds.read()
    }

    /// Overwrite the supplied thresholds, clamped to [0, 1]. Non-finite values
    /// are ignored. Returns the thresholds now in effect.
    pub fn update_thresholds(&self, hand: Option<f64>, gesture: Option<f64>) -> Thresholds {
        let mut thresholds = self.thresholds.write();
        if let Some(value) = hand.filter(|v| v.is_finite()) {
            thresholds.hand_detection = value.clamp(0.0, 1.0);
            info!("Updated hand detection confidence: {:.2}", thresholds.hand_detection);
        }
        if let Some(value) = gesture.filter(|v| v.is_finite()) {
            thresholds.gesture_recognition = value.clamp(0.0, 1.0);
            info!(
                "Updated gesture recognition confidence: {:.2}",
                thresholds.gesture_recognition
            );
        }
        *thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AppContext {
        AppContext::from_config(&Config::default(), None)
    }

    #[test]
    fn test_from_config_defaults() {
        let ctx = context();
        assert_eq!(ctx.thresholds(), Thresholds::default());
        assert_eq!(ctx.session_settings(), SessionSettings::default());
        assert_eq!(ctx.matcher().max_points(), 50);
        assert!(!ctx.pipeline().has_detector());
        assert_eq!(ctx.pipeline().settings().inference_size, 320);
    }

    #[test]
    fn test_update_single_threshold() {
        let ctx = context();
        let updated = ctx.update_thresholds(Some(0.4), None);
        assert_eq!(updated.hand_detection, 0.4);
        assert_eq!(updated.gesture_recognition, 0.85);
        assert_eq!(ctx.thresholds(), updated);
    }

    #[test]
    fn test_update_clamps_and_skips_nan() {
        let ctx = context();
        let updated = ctx.update_thresholds(Some(2.0), Some(f64::NAN));
        assert_eq!(updated.hand_detection, 1.0);
        assert_eq!(updated.gesture_recognition, 0.85);
    }

    #[test]
    fn test_zero_strides_are_raised() {
        let ctx = AppContext::new(
            DetectionPipeline::new(None, PipelineSettings::default()),
            Thresholds::default(),
            GestureMatcher::new(),
            SessionSettings {
                frame_stride: 0,
                forced_frame_stride: 0,
            },
        );
        assert_eq!(ctx.session_settings().frame_stride, 1);
        assert_eq!(ctx.session_settings().forced_frame_stride, 1);
    }
}
