use super::defaults;
use super::models::{LogLevel, TrackerConfig};
use serde::{Deserialize, Serialize};

/// Sectioned on-disk layout of `tracker.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    resolver: ResolverTable,
    #[serde(default)]
    progress: ProgressTable,
    #[serde(default)]
    animation: AnimationTable,
    #[serde(default)]
    logging: LoggingTable,
}

impl From<ConfigTables> for TrackerConfig {
    fn from(tables: ConfigTables) -> Self {
        TrackerConfig {
            top_guard_px: tables.resolver.top_guard_px,
            bottom_guard_px: tables.resolver.bottom_guard_px,
            center_ratio: tables.resolver.center_ratio,
            index_bias: tables.resolver.index_bias,
            terminal_section: tables.resolver.terminal_section,
            progress_epsilon: tables.progress.epsilon,
            visibility_threshold_px: tables.progress.visibility_threshold_px,
            replay_enter_animations: tables.animation.replay_enter,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&TrackerConfig> for ConfigTables {
    fn from(config: &TrackerConfig) -> Self {
        ConfigTables {
            resolver: ResolverTable {
                top_guard_px: config.top_guard_px,
                bottom_guard_px: config.bottom_guard_px,
                center_ratio: config.center_ratio,
                index_bias: config.index_bias,
                terminal_section: config.terminal_section.clone(),
            },
            progress: ProgressTable {
                epsilon: config.progress_epsilon,
                visibility_threshold_px: config.visibility_threshold_px,
            },
            animation: AnimationTable {
                replay_enter: config.replay_enter_animations,
            },
            logging: LoggingTable {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ResolverTable {
    #[serde(default = "defaults::default_top_guard_px")]
    top_guard_px: f64,
    #[serde(default = "defaults::default_bottom_guard_px")]
    bottom_guard_px: f64,
    #[serde(default = "defaults::default_center_ratio")]
    center_ratio: f64,
    #[serde(default = "defaults::default_index_bias")]
    index_bias: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    terminal_section: Option<String>,
}

impl Default for ResolverTable {
    fn default() -> Self {
        ResolverTable {
            top_guard_px: defaults::default_top_guard_px(),
            bottom_guard_px: defaults::default_bottom_guard_px(),
            center_ratio: defaults::default_center_ratio(),
            index_bias: defaults::default_index_bias(),
            terminal_section: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ProgressTable {
    #[serde(default = "defaults::default_progress_epsilon")]
    epsilon: f64,
    #[serde(default = "defaults::default_visibility_threshold_px")]
    visibility_threshold_px: f64,
}

impl Default for ProgressTable {
    fn default() -> Self {
        ProgressTable {
            epsilon: defaults::default_progress_epsilon(),
            visibility_threshold_px: defaults::default_visibility_threshold_px(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct AnimationTable {
    #[serde(default = "defaults::default_replay_enter_animations")]
    replay_enter: bool,
}

impl Default for AnimationTable {
    fn default() -> Self {
        AnimationTable {
            replay_enter: defaults::default_replay_enter_animations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct LoggingTable {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingTable {
    fn default() -> Self {
        LoggingTable {
            log_level: defaults::default_log_level(),
        }
    }
}
