//! Tracing setup for hosts embedding the tracker.
//!
//! The filter sits behind a reload layer so the level from `tracker.toml` can
//! be applied after the subscriber is installed.

use crate::config::LogLevel;
use once_cell::sync::OnceCell;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

pub type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static RELOAD_HANDLE: OnceCell<ReloadHandle> = OnceCell::new();

/// Install the global subscriber once; later calls return the same handle.
pub fn init_tracing() -> &'static ReloadHandle {
    RELOAD_HANDLE.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let (filter_layer, handle) = reload::Layer::new(env_filter);
        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(filter_layer),
            )
            .try_init();
        if installed.is_ok() {
            warn!("Logging initialized; override level with log_level or RUST_LOG");
        }
        handle
    })
}

pub fn set_log_level(handle: &ReloadHandle, level: LogLevel) {
    let filter = level.as_filter_str();
    let parsed = EnvFilter::builder()
        .parse(filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|current| *current = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
