mod loader;
pub mod template;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hook::{ClassificationPolicy, DEFAULT_MARGIN, HookSettings};
use crate::log::LogConfig;
use crate::platform::OsGeneration;
use crate::process::CacheTimings;
use crate::tracker::DEFAULT_POLL_INTERVAL;

pub use loader::{config_dir, config_path, load, try_load};

/// Top-level configuration for toastpilot.
///
/// Loaded from `~/.config/toastpilot/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LogConfig,
    pub tracker: TrackerConfig,
    pub hook: HookConfig,
    pub cache: CacheConfig,
}

/// Foreground and window polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Interval between poll cycles, in milliseconds.
    pub poll_interval_ms: u64,
}

/// Notification popup handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Distance in pixels between a moved popup and the work-area corner.
    pub margin: i32,
    /// Seconds between hook statistics log lines.
    pub stats_interval_secs: u64,
    /// Which popup classification rules to use.
    pub os_generation: OsGenerationSetting,
}

/// Process-name cache lifetimes, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub process_ttl_secs: u64,
    pub failure_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

/// `auto` detects the OS build at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsGenerationSetting {
    #[default]
    Auto,
    Modern,
    Legacy,
}

impl OsGenerationSetting {
    /// Resolves the setting, consulting `detect` only for `Auto`.
    pub fn resolve(self, detect: impl FnOnce() -> OsGeneration) -> OsGeneration {
        match self {
            Self::Auto => detect(),
            Self::Modern => OsGeneration::Modern,
            Self::Legacy => OsGeneration::Legacy,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            stats_interval_secs: 60,
            os_generation: OsGenerationSetting::Auto,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let timings = CacheTimings::default();
        Self {
            process_ttl_secs: timings.ttl.as_secs(),
            failure_ttl_secs: timings.failure_ttl.as_secs(),
            sweep_interval_secs: timings.sweep_interval.as_secs(),
        }
    }
}

impl Config {
    /// Clamps every value to a usable range.
    pub fn validate(&mut self) {
        self.tracker.poll_interval_ms = self.tracker.poll_interval_ms.clamp(50, 10_000);
        self.hook.margin = self.hook.margin.clamp(0, 200);
        self.hook.stats_interval_secs = self.hook.stats_interval_secs.clamp(5, 3600);
        self.cache.process_ttl_secs = self.cache.process_ttl_secs.clamp(1, 86_400);
        self.cache.failure_ttl_secs = self
            .cache
            .failure_ttl_secs
            .clamp(1, self.cache.process_ttl_secs);
        self.cache.sweep_interval_secs = self.cache.sweep_interval_secs.clamp(1, 3600);
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.tracker.poll_interval_ms)
    }

    pub fn cache_timings(&self) -> CacheTimings {
        CacheTimings {
            ttl: Duration::from_secs(self.cache.process_ttl_secs),
            failure_ttl: Duration::from_secs(self.cache.failure_ttl_secs),
            sweep_interval: Duration::from_secs(self.cache.sweep_interval_secs),
        }
    }

    /// Builds the hook settings for the OS generation in use.
    pub fn hook_settings(&self, generation: OsGeneration) -> HookSettings {
        HookSettings {
            policy: ClassificationPolicy::for_generation(generation),
            margin: self.hook.margin,
            stats_interval: Duration::from_secs(self.hook.stats_interval_secs),
        }
    }
}
