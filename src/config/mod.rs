//! Configuration loading for the section tracker.
//!
//! The resolver's guard bands, the scoring bias and the progress policy encode
//! layout-dependent tuning, so they are loaded from `conf/tracker.toml` when
//! present. Missing or invalid entries fall back to defaults so tracking can
//! still start.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config, try_load_config};
pub use models::{LogLevel, ResolverTuning, TrackerConfig};
