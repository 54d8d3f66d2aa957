use super::defaults;
use super::models::TrackerConfig;
use super::tables::ConfigTables;
use crate::error::TrackerError;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const TABLE_KEYS: [&str; 4] = ["resolver", "progress", "animation", "logging"];

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> TrackerConfig {
    match try_load_config(path) {
        Ok(cfg) => {
            info!(path = %path.display(), "Loaded tracker config");
            cfg
        }
        Err(err @ TrackerError::ConfigIo { .. }) => {
            warn!("Falling back to default tracker config: {err}");
            TrackerConfig::default()
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid tracker config: {err}");
            TrackerConfig::default()
        }
    }
}

/// Strict variant of [`load_config`] that reports why loading failed.
pub fn try_load_config(path: &Path) -> Result<TrackerConfig, TrackerError> {
    let contents = fs::read_to_string(path).map_err(|source| TrackerError::ConfigIo {
        path: path.display().to_string(),
        source,
    })?;
    let cfg = parse_config(&contents)?;
    debug!("Parsed tracker configuration from disk");
    Ok(cfg)
}

/// Parse either the sectioned (`[resolver]`, `[progress]`, ...) or the flat
/// layout. Values outside their usable range are reset to defaults.
pub fn parse_config(contents: &str) -> Result<TrackerConfig, TrackerError> {
    let raw: toml::Table = toml::from_str(contents)?;
    let sectioned = TABLE_KEYS
        .iter()
        .any(|key| matches!(raw.get(*key), Some(toml::Value::Table(_))));

    let config = if sectioned {
        TrackerConfig::from(toml::from_str::<ConfigTables>(contents)?)
    } else {
        toml::from_str::<TrackerConfig>(contents)?
    };
    Ok(sanitize(config))
}

/// Serialize to the sectioned layout.
pub fn serialize_config(config: &TrackerConfig) -> Result<String, TrackerError> {
    Ok(toml::to_string(&ConfigTables::from(config))?)
}

fn sanitize(mut config: TrackerConfig) -> TrackerConfig {
    if !is_usable_px(config.top_guard_px) {
        warn!(value = config.top_guard_px, "top_guard_px out of range; using default");
        config.top_guard_px = defaults::default_top_guard_px();
    }
    if !is_usable_px(config.bottom_guard_px) {
        warn!(
            value = config.bottom_guard_px,
            "bottom_guard_px out of range; using default"
        );
        config.bottom_guard_px = defaults::default_bottom_guard_px();
    }
    if !(config.center_ratio.is_finite() && (0.0..=1.0).contains(&config.center_ratio)) {
        warn!(value = config.center_ratio, "center_ratio out of range; using default");
        config.center_ratio = defaults::default_center_ratio();
    }
    if !is_usable_px(config.index_bias) {
        warn!(value = config.index_bias, "index_bias out of range; using default");
        config.index_bias = defaults::default_index_bias();
    }
    if !is_usable_px(config.progress_epsilon) {
        warn!(
            value = config.progress_epsilon,
            "progress_epsilon out of range; using default"
        );
        config.progress_epsilon = defaults::default_progress_epsilon();
    }
    if !is_usable_px(config.visibility_threshold_px) {
        warn!(
            value = config.visibility_threshold_px,
            "visibility_threshold_px out of range; using default"
        );
        config.visibility_threshold_px = defaults::default_visibility_threshold_px();
    }
    if let Some(id) = config.terminal_section.as_deref() {
        if id.trim().is_empty() {
            config.terminal_section = None;
        }
    }
    config
}

fn is_usable_px(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
