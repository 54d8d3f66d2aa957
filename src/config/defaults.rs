pub(crate) fn default_top_guard_px() -> f64 {
    100.0
}

pub(crate) fn default_bottom_guard_px() -> f64 {
    50.0
}

pub(crate) fn default_center_ratio() -> f64 {
    0.5
}

pub(crate) fn default_index_bias() -> f64 {
    10.0
}

pub(crate) fn default_progress_epsilon() -> f64 {
    0.01
}

pub(crate) fn default_visibility_threshold_px() -> f64 {
    300.0
}

pub(crate) fn default_replay_enter_animations() -> bool {
    false
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
