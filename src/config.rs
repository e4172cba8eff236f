//! Configuration for the feed.
//!
//! Every section has sensible defaults so an empty (or absent) config file
//! yields a working three-lane feed against a local image proxy. Values can
//! be tuned through a JSON file and a handful of environment overrides.
//!
//! # Example
//!
//! ```ignore
//! use lanefeed::config::{FeedConfig, PipelineConfig};
//!
//! let config = FeedConfig::default().with_pipeline(
//!     PipelineConfig::default()
//!         .with_lane_count(4)
//!         .with_batch_size(20),
//! );
//! config.validate()?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "LANEFEED_CONFIG";
/// Environment override for [`SourceConfig::base_url`].
pub const SOURCE_URL_ENV: &str = "LANEFEED_SOURCE_URL";
/// Environment override for [`PipelineConfig::lane_count`].
pub const LANES_ENV: &str = "LANEFEED_LANES";
/// Environment override for [`PipelineConfig::batch_size`].
pub const BATCH_SIZE_ENV: &str = "LANEFEED_BATCH_SIZE";
/// Environment override for [`PipelineConfig::low_water`].
pub const LOW_WATER_ENV: &str = "LANEFEED_LOW_WATER";

/// Sizing of lanes, buffers and replenishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of parallel lanes (default: 3)
    pub lane_count: usize,
    /// Items visible in one lane at a time (default: 8)
    pub visible_count: usize,
    /// Items kept queued beyond the visible window (default: 3)
    pub prefetch_margin: usize,
    /// Reservoir depth below which a replenishment is requested (default: 40)
    pub low_water: usize,
    /// Items requested per replenishment (default: 40)
    pub batch_size: usize,
    /// Maximum size of the recycle pool (default: 100)
    pub recycle_capacity: usize,
    /// Extra items fetched at bootstrap to seed the overflow buffer (default: 60)
    pub bootstrap_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lane_count: 3,
            visible_count: 8,
            prefetch_margin: 3,
            low_water: 40,
            batch_size: 40,
            recycle_capacity: 100,
            bootstrap_buffer: 60,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth every lane is driven toward.
    pub fn target_depth(&self) -> usize {
        self.visible_count + self.prefetch_margin
    }

    /// Items needed to fill every lane exactly to target depth.
    pub fn initial_total(&self) -> usize {
        self.lane_count * self.target_depth()
    }

    pub fn with_lane_count(mut self, lane_count: usize) -> Self {
        self.lane_count = lane_count;
        self
    }

    pub fn with_visible_count(mut self, visible_count: usize) -> Self {
        self.visible_count = visible_count;
        self
    }

    pub fn with_prefetch_margin(mut self, prefetch_margin: usize) -> Self {
        self.prefetch_margin = prefetch_margin;
        self
    }

    pub fn with_low_water(mut self, low_water: usize) -> Self {
        self.low_water = low_water;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_recycle_capacity(mut self, recycle_capacity: usize) -> Self {
        self.recycle_capacity = recycle_capacity;
        self
    }

    pub fn with_bootstrap_buffer(mut self, bootstrap_buffer: usize) -> Self {
        self.bootstrap_buffer = bootstrap_buffer;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count == 0 {
            return Err(ConfigError::invalid("lane_count", "must be at least 1"));
        }
        if self.target_depth() == 0 {
            return Err(ConfigError::invalid(
                "visible_count",
                "visible_count + prefetch_margin must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be at least 1"));
        }
        if self.recycle_capacity == 0 {
            return Err(ConfigError::invalid("recycle_capacity", "must be at least 1"));
        }
        Ok(())
    }
}

/// Where and how batches are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the image proxy (default: http://localhost:5000)
    pub base_url: String,
    /// Batch endpoint path (default: /api/dogs)
    pub path: String,
    /// Per-request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            path: "/api/dogs".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "base_url",
                format!("'{}' is not an http(s) URL", self.base_url),
            ));
        }
        if !self.path.starts_with('/') {
            return Err(ConfigError::invalid("path", "must start with '/'"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Cadence of the timer-driven exit detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Milliseconds between exits, one entry per lane. A single entry
    /// applies to every lane. (default: [2500])
    pub interval_ms: Vec<u64>,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            interval_ms: vec![2500],
        }
    }
}

impl ExitConfig {
    pub fn with_interval_ms(mut self, interval_ms: Vec<u64>) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Exit interval for a lane.
    pub fn interval_for(&self, lane: usize) -> Duration {
        let ms = self
            .interval_ms
            .get(lane)
            .or_else(|| self.interval_ms.last())
            .copied()
            .unwrap_or(2500);
        Duration::from_millis(ms)
    }

    pub fn validate(&self, lane_count: usize) -> Result<(), ConfigError> {
        if self.interval_ms.is_empty() {
            return Err(ConfigError::invalid("interval_ms", "needs at least one entry"));
        }
        if self.interval_ms.len() > 1 && self.interval_ms.len() != lane_count {
            return Err(ConfigError::invalid(
                "interval_ms",
                format!(
                    "has {} entries for {} lanes",
                    self.interval_ms.len(),
                    lane_count
                ),
            ));
        }
        if self.interval_ms.contains(&0) {
            return Err(ConfigError::invalid("interval_ms", "intervals must be positive"));
        }
        Ok(())
    }
}

/// Complete feed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub exit: ExitConfig,
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }

    pub fn with_exit(mut self, exit: ExitConfig) -> Self {
        self.exit = exit;
        self
    }

    /// Read a JSON config file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration the way the binary does: an explicit path wins,
    /// then `LANEFEED_CONFIG`, then defaults; environment overrides are
    /// applied on top and the result is validated.
    pub fn load(explicit_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LANEFEED_*` environment overrides.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var(SOURCE_URL_ENV) {
            self.source.base_url = url;
        }
        if let Some(lanes) = env_usize(LANES_ENV)? {
            self.pipeline.lane_count = lanes;
        }
        if let Some(batch) = env_usize(BATCH_SIZE_ENV)? {
            self.pipeline.batch_size = batch;
        }
        if let Some(low_water) = env_usize(LOW_WATER_ENV)? {
            self.pipeline.low_water = low_water;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        self.source.validate()?;
        self.exit.validate(self.pipeline.lane_count)?;
        Ok(())
    }
}

fn env_usize(var: &'static str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}
