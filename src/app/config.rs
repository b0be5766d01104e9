//! Configuration Management

use crate::capture::types::SPEED_WINDOW_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Experiment label encoded by the `experiment_staircase_SSD` feature
pub const DEFAULT_EXPERIMENT_LABEL: &str = "staircase_SSD";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Capture settings
    pub capture: CaptureConfig,
    /// Feature aggregation settings
    pub features: FeatureConfig,
    /// Inference transport settings
    pub transport: TransportConfig,
    /// Rule-based fallback thresholds
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Session export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Minimum time between accepted samples (ms)
    pub sample_interval_ms: u64,
    /// Minimum movement from the last accepted sample (pixels)
    pub min_distance_px: f64,
    /// Slowest speed counted toward the speed average (px/s)
    pub min_speed_px_s: f64,
    /// Fastest speed counted toward the speed average (px/s)
    pub max_speed_px_s: f64,
    /// Number of recent speeds kept for the average (at most 50)
    pub speed_window: usize,
}

/// Feature aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Experiment label assigned to new trials
    pub experiment_label: String,
    /// Mean stop-signal delay subtracted in the SSRT estimate (ms)
    pub mean_stop_signal_delay_ms: f64,
}

/// Inference transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Prediction endpoint
    pub endpoint: String,
    /// Per-request timeout (ms)
    pub timeout_ms: u64,
    /// Total request attempts before giving up
    pub max_attempts: u32,
    /// Base backoff between attempts (ms), doubled per attempt
    pub backoff_base_ms: u64,
}

/// Thresholds for the rule-based probability estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Score before any indicator fires
    pub baseline: f64,
    /// Speed standard deviation above which motion counts as erratic (px/s)
    pub speed_std_threshold: f64,
    pub speed_std_weight: f64,
    /// Path efficiency below which paths count as inefficient (%)
    pub path_efficiency_threshold: f64,
    pub path_efficiency_weight: f64,
    /// Latency above which responses count as hesitant (ms)
    pub latency_threshold_ms: f64,
    pub latency_weight: f64,
}

/// Session export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported sessions (defaults to ~/.drift/sessions)
    pub output_dir: Option<PathBuf>,
    /// Also write the flattened CSV of samples
    pub write_csv: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 16,
            min_distance_px: 2.0,
            min_speed_px_s: 10.0,
            max_speed_px_s: 5000.0,
            speed_window: SPEED_WINDOW_CAPACITY,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            experiment_label: DEFAULT_EXPERIMENT_LABEL.to_string(),
            mean_stop_signal_delay_ms: 250.0,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/predict".to_string(),
            timeout_ms: 5_000,
            max_attempts: 2,
            backoff_base_ms: 500,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            baseline: 0.2,
            speed_std_threshold: 40.0,
            speed_std_weight: 0.2,
            path_efficiency_threshold: 30.0,
            path_efficiency_weight: 0.3,
            latency_threshold_ms: 4000.0,
            latency_weight: 0.2,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            write_csv: true,
        }
    }
}

impl ExportConfig {
    /// Resolved output directory
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".drift").join("sessions"))
                .unwrap_or_else(|| PathBuf::from("sessions"))
        })
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.capture.sample_interval_ms == 0 {
            return Err(crate::Error::Config("sample_interval_ms must be > 0".to_string()));
        }
        if !(self.capture.min_distance_px >= 0.0 && self.capture.min_distance_px.is_finite()) {
            return Err(crate::Error::Config(format!(
                "min_distance_px must be a non-negative number, got {}", self.capture.min_distance_px
            )));
        }
        if !(self.capture.min_speed_px_s >= 0.0 && self.capture.min_speed_px_s < self.capture.max_speed_px_s) {
            return Err(crate::Error::Config(format!(
                "speed band must satisfy 0 <= min < max, got [{}, {}]",
                self.capture.min_speed_px_s, self.capture.max_speed_px_s
            )));
        }
        if self.capture.speed_window == 0 || self.capture.speed_window > SPEED_WINDOW_CAPACITY {
            return Err(crate::Error::Config(format!(
                "speed_window must be in [1, {}], got {}",
                SPEED_WINDOW_CAPACITY, self.capture.speed_window
            )));
        }
        if self.features.experiment_label.trim().is_empty() {
            return Err(crate::Error::Config("experiment_label must not be empty".to_string()));
        }
        if !(self.features.mean_stop_signal_delay_ms >= 0.0) {
            return Err(crate::Error::Config(format!(
                "mean_stop_signal_delay_ms must be >= 0, got {}", self.features.mean_stop_signal_delay_ms
            )));
        }
        if !(self.transport.endpoint.starts_with("http://") || self.transport.endpoint.starts_with("https://")) {
            return Err(crate::Error::Config(format!(
                "endpoint must be an http(s) URL, got {:?}", self.transport.endpoint
            )));
        }
        if self.transport.timeout_ms == 0 {
            return Err(crate::Error::Config("timeout_ms must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.fallback.baseline) {
            return Err(crate::Error::Config(format!(
                "fallback baseline must be in [0, 1], got {}", self.fallback.baseline
            )));
        }
        if !(0.0..=100.0).contains(&self.fallback.path_efficiency_threshold) {
            return Err(crate::Error::Config(format!(
                "path_efficiency_threshold must be in [0, 100], got {}", self.fallback.path_efficiency_threshold
            )));
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

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

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
            .map(|h| h.join(".drift").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
