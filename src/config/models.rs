use serde::Deserialize;
use ts_rs::TS;

/// Tracker configuration; deserializable from the flat TOML form and produced
/// by the sectioned form in `tables.rs`.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct TrackerConfig {
    #[serde(default = "crate::config::defaults::default_top_guard_px")]
    pub top_guard_px: f64,
    #[serde(default = "crate::config::defaults::default_bottom_guard_px")]
    pub bottom_guard_px: f64,
    #[serde(default = "crate::config::defaults::default_center_ratio")]
    pub center_ratio: f64,
    #[serde(default = "crate::config::defaults::default_index_bias")]
    pub index_bias: f64,
    /// Section preferred by the bottom-of-page rule, overriding any region
    /// flagged by the provider.
    #[serde(default)]
    pub terminal_section: Option<String>,
    #[serde(default = "crate::config::defaults::default_progress_epsilon")]
    pub progress_epsilon: f64,
    #[serde(default = "crate::config::defaults::default_visibility_threshold_px")]
    pub visibility_threshold_px: f64,
    #[serde(default = "crate::config::defaults::default_replay_enter_animations")]
    pub replay_enter_animations: bool,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            top_guard_px: crate::config::defaults::default_top_guard_px(),
            bottom_guard_px: crate::config::defaults::default_bottom_guard_px(),
            center_ratio: crate::config::defaults::default_center_ratio(),
            index_bias: crate::config::defaults::default_index_bias(),
            terminal_section: None,
            progress_epsilon: crate::config::defaults::default_progress_epsilon(),
            visibility_threshold_px: crate::config::defaults::default_visibility_threshold_px(),
            replay_enter_animations: crate::config::defaults::default_replay_enter_animations(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl TrackerConfig {
    pub fn resolver_tuning(&self) -> ResolverTuning {
        ResolverTuning {
            top_guard_px: self.top_guard_px,
            bottom_guard_px: self.bottom_guard_px,
            center_ratio: self.center_ratio,
            index_bias: self.index_bias,
        }
    }
}

/// The subset of configuration the resolver reads on every pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverTuning {
    pub top_guard_px: f64,
    pub bottom_guard_px: f64,
    pub center_ratio: f64,
    pub index_bias: f64,
}

impl Default for ResolverTuning {
    fn default() -> Self {
        TrackerConfig::default().resolver_tuning()
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
