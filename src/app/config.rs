//! Configuration Management

use crate::detection::latency::DEFAULT_WINDOW_CAPACITY;
use crate::detection::pipeline::{DEFAULT_INFERENCE_SIZE, DEFAULT_REPORT_EVERY};
use crate::gesture::matcher::DEFAULT_MAX_RESAMPLE_POINTS;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

/// Environment variable holding the hosted inference API key
pub const ENV_API_KEY: &str = "ROBOFLOW_API_KEY";
/// Environment variable overriding the detection model id
pub const ENV_MODEL_ID: &str = "ROBOFLOW_MODEL_ID";
/// Environment variable overriding the initial hand-detection threshold
pub const ENV_CONFIDENCE: &str = "CONFIDENCE_THRESHOLD";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(Default)]
pub struct Config {
    /// Listener settings
    pub server: ServerConfig,
    /// Hand detection settings
    pub detection: DetectionConfig,
    /// Gesture recognition settings
    pub gesture: GestureConfig,
    /// Per-connection settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Hand detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Hosted model identifier (`project/version`)
    pub model_id: String,
    /// Base URL of the hosted inference API
    pub api_endpoint: String,
    /// API key; only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Square inference resolution (pixels)
    pub inference_size: u32,
    /// Latency samples kept for throughput reports
    pub latency_window: usize,
    /// Detections between throughput reports
    pub report_every: u64,
    /// Inference request timeout (ms)
    pub request_timeout_ms: u64,
    /// Initial hand-detection threshold
    pub hand_confidence: f64,
}

/// Gesture recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Initial recognition threshold
    pub recognition_confidence: f64,
    /// Cap on resampled points per comparison
    pub max_resample_points: usize,
}

/// Per-connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run detection on every Nth frame
    pub frame_stride: u32,
    /// Stride used after a forced refresh request
    pub forced_frame_stride: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_id: "handdetection-qycc7/1".to_string(),
            api_endpoint: "https://detect.roboflow.com".to_string(),
            api_key: None,
            inference_size: DEFAULT_INFERENCE_SIZE,
            latency_window: DEFAULT_WINDOW_CAPACITY,
            report_every: DEFAULT_REPORT_EVERY,
            request_timeout_ms: 5000,
            hand_confidence: 0.75,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            recognition_confidence: 0.85,
            max_resample_points: DEFAULT_MAX_RESAMPLE_POINTS,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_stride: 2,
            forced_frame_stride: 1,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.server.host.trim().is_empty() {
            return Err(crate::Error::Config("host must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(crate::Error::Config("port must be > 0".to_string()));
        }
        if self.detection.model_id.trim().is_empty() {
            return Err(crate::Error::Config("model_id must not be empty".to_string()));
        }
        if !self.detection.api_endpoint.starts_with("http://")
            && !self.detection.api_endpoint.starts_with("https://")
        {
            return Err(crate::Error::Config(format!(
                "api_endpoint must be an http(s) URL, got {}", self.detection.api_endpoint
            )));
        }
        if self.detection.inference_size == 0 || self.detection.inference_size > 4096 {
            return Err(crate::Error::Config(format!(
                "inference_size must be in [1, 4096], got {}", self.detection.inference_size
            )));
        }
        if self.detection.latency_window == 0 {
            return Err(crate::Error::Config("latency_window must be > 0".to_string()));
        }
        if self.detection.report_every == 0 {
            return Err(crate::Error::Config("report_every must be > 0".to_string()));
        }
        if self.detection.request_timeout_ms == 0 {
            return Err(crate::Error::Config("request_timeout_ms must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.detection.hand_confidence) {
            return Err(crate::Error::Config(format!(
                "hand_confidence must be in [0, 1], got {}", self.detection.hand_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.gesture.recognition_confidence) {
            return Err(crate::Error::Config(format!(
                "recognition_confidence must be in [0, 1], got {}", self.gesture.recognition_confidence
            )));
        }
        if self.gesture.max_resample_points < 2 {
            return Err(crate::Error::Config(format!(
                "max_resample_points must be >= 2, got {}", self.gesture.max_resample_points
            )));
        }
        if self.session.frame_stride == 0 || self.session.forced_frame_stride == 0 {
            return Err(crate::Error::Config("frame strides must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), crate::Error> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.detection.api_key = Some(key);
        }
        if let Some(model_id) = lookup(ENV_MODEL_ID).filter(|m| !m.trim().is_empty()) {
            self.detection.model_id = model_id;
        }
        if let Some(raw) = lookup(ENV_CONFIDENCE) {
            self.detection.hand_confidence = raw.trim().parse().map_err(|_| {
                crate::Error::Config(format!("{} must be a number, got '{}'", ENV_CONFIDENCE, raw))
            })?;
        }
        self.validate()
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".aircut").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Resolve the listen address
    pub fn socket_addr(&self) -> Result<SocketAddr, crate::Error> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                crate::Error::Config(format!("cannot resolve host '{}'", self.server.host))
            })
    }
}
