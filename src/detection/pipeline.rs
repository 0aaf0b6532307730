//! Frame Detection Pipeline
//!
//! Runs the hand detector on incoming frames and keeps the process-wide
//! detection state: the latest detection, cumulative counters, and a rolling
//! latency window.
//!
//! Architecture:
//! - One pipeline instance is shared by every connection
//! - A single mutex covers inference plus the statistics update, so at most
//!   one frame is being detected at any time
//! - Inference runs on a downscaled square copy of the frame; the original
//!   dimensions are only used to map the result back
//!
//! `process_frame` blocks for the duration of inference. Async callers should
//! run it on a blocking thread.

use super::detector::HandDetector;
use super::latency::{LatencyWindow, ThroughputReport, DEFAULT_WINDOW_CAPACITY};
use super::types::{best_prediction, Detection};
use crate::app::config::DetectionConfig;
use image::imageops::FilterType;
use image::DynamicImage;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Default square inference resolution
pub const DEFAULT_INFERENCE_SIZE: u32 = 320;

/// Default number of detections between throughput reports
pub const DEFAULT_REPORT_EVERY: u64 = 60;

/// Pipeline tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Side length of the square image handed to the detector
    pub inference_size: u32,
    /// Latency samples kept for throughput reports
    pub latency_window: usize,
    /// Emit a throughput report every N detections
    pub report_every: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            inference_size: DEFAULT_INFERENCE_SIZE,
            latency_window: DEFAULT_WINDOW_CAPACITY,
            report_every: DEFAULT_REPORT_EVERY,
        }
    }
}

impl From<&DetectionConfig> for PipelineSettings {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            inference_size: config.inference_size.max(1),
            latency_window: config.latency_window.max(1),
            report_every: config.report_every.max(1),
        }
    }
}

/// Snapshot of pipeline statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStats {
    pub tracking_enabled: bool,
    pub frames_processed: u64,
    pub detections_made: u64,
    pub window_samples: usize,
    pub avg_latency_secs: Option<f64>,
    pub last_report: Option<ThroughputReport>,
}

/// Health endpoint payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub tracking_enabled: bool,
    pub frames_processed: u64,
    pub detections_made: u64,
    pub inference_available: bool,
    pub model_loaded: bool,
}

/// State guarded by the pipeline mutex
struct PipelineState {
    current: Option<Detection>,
    frames_processed: u64,
    detections_made: u64,
    latencies: LatencyWindow,
    window_started: Instant,
    last_report: Option<ThroughputReport>,
}

/// Shared per-frame detection pipeline
pub struct DetectionPipeline {
    detector: Option<Arc<dyn HandDetector>>,
    settings: PipelineSettings,
    tracking_enabled: AtomicBool,
    state: Mutex<PipelineState>,
}

impl DetectionPipeline {
    /// Create a pipeline. Tracking starts enabled.
    pub fn new(detector: Option<Arc<dyn HandDetector>>, settings: PipelineSettings) -> Self {
        Self {
            detector,
            settings,
            tracking_enabled: AtomicBool::new(true),
            state: Mutex::new(PipelineState {
                current: None,
                frames_processed: 0,
                detections_made: 0,
                latencies: LatencyWindow::with_capacity(settings.latency_window),
                window_started: Instant::now(),
                last_report: None,
            }),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled.load(Ordering::Acquire)
    }

    /// Enable or disable tracking. Disabling also clears the current detection.
    pub fn set_tracking(&self, enabled: bool) {
        self.tracking_enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.state.lock().current = None;
        }
    }

    /// Most recent detection, if any
    pub fn current_detection(&self) -> Option<Detection> {
        self.state.lock().current.clone()
    }

    /// Detect the most confident hand in `image`.
    ///
    /// Returns `None` when tracking is off, no detector is installed, no image
    /// was supplied, the detector fails, or nothing beats `confidence`.
    pub fn process_frame(&self, image: Option<&DynamicImage>, confidence: f64) -> Option<Detection> {
        let image = image?;
        if !self.tracking_enabled() {
            return None;
        }
        let detector = self.detector.as_ref()?;

        let mut state = self.state.lock();
        state.frames_processed += 1;
        let started = Instant::now();

        let (width, height) = (image.width(), image.height());
        let size = self.settings.inference_size;
        let resized = image.resize_exact(size, size, FilterType::Triangle);

        let predictions = match detector.infer(&resized, confidence) {
            Ok(predictions) => predictions,
            Err(e) => {
                error!("Detection error: {}", e);
                return None;
            }
        };

        // Tracking may have been stopped while the detector ran
        if !self.tracking_enabled() {
            debug!("Tracking disabled during inference, dropping result");
            return None;
        }

        let best = best_prediction(&predictions)?;
        if best.confidence <= confidence {
            debug!(
                "Best prediction {:.2} below threshold {:.2}",
                best.confidence, confidence
            );
            return None;
        }

        let scale_x = f64::from(width) / f64::from(size);
        let scale_y = f64::from(height) / f64::from(size);
        let detection = best.rescale(scale_x, scale_y);

        state.current = Some(detection.clone());
        state.detections_made += 1;
        state.latencies.push(started.elapsed());

        if state.detections_made % self.settings.report_every == 0 {
            Self::emit_report(&mut state);
        }

        Some(detection)
    }

    /// Log a throughput summary and restart the window
    fn emit_report(state: &mut PipelineState) {
        let now = Instant::now();
        if let Some(report) = state.latencies.report(now - state.window_started) {
            info!(
                "Detection FPS: {:.1}, Avg time: {:.3}s",
                report.detections_per_sec, report.avg_latency_secs
            );
            state.last_report = Some(report);
            state.window_started = now;
            state.latencies.clear();
        }
    }

    pub fn stats(&self) -> PipelineStats {
        let state = self.state.lock();
        PipelineStats {
            tracking_enabled: self.tracking_enabled(),
            frames_processed: state.frames_processed,
            detections_made: state.detections_made,
            window_samples: state.latencies.len(),
            avg_latency_secs: state.latencies.average().map(|d| d.as_secs_f64()),
            last_report: state.last_report,
        }
    }

    pub fn health(&self) -> HealthReport {
        let stats = self.stats();
        HealthReport {
            status: "healthy".to_string(),
            tracking_enabled: stats.tracking_enabled,
            frames_processed: stats.frames_processed,
            detections_made: stats.detections_made,
            inference_available: self.has_detector(),
            model_loaded: self.detector.as_ref().map(|d| d.is_ready()).unwrap_or(false),
        }
    }
}
