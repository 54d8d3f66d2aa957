//! Stock listeners: a page progress bar and enter/exit animation hooks.

use crate::config::TrackerConfig;
use crate::lifecycle::LifecycleListener;
use anyhow::Result;
use std::collections::HashSet;
use tracing::trace;

/// Reading progress indicator. Holds what the renderer needs to paint a fill
/// bar and counts repaints so the host can assert it is not over-drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressBar {
    fill_percent: f64,
    visible: bool,
    repaints: u64,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_percent(&self) -> f64 {
        self.fill_percent
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn repaints(&self) -> u64 {
        self.repaints
    }

    /// CSS width for the fill element.
    pub fn css_width(&self) -> String {
        format!("{:.2}%", self.fill_percent)
    }
}

impl LifecycleListener for ProgressBar {
    fn name(&self) -> &str {
        "progress-bar"
    }

    fn on_progress(&mut self, percent: f64) -> Result<()> {
        self.fill_percent = percent.clamp(0.0, 100.0);
        self.repaints += 1;
        Ok(())
    }

    fn on_visibility_change(&mut self, visible: bool) -> Result<()> {
        self.visible = visible;
        self.repaints += 1;
        Ok(())
    }
}

/// Renderer side of section animations.
pub trait AnimationPort {
    fn play_enter(&mut self, id: &str) -> Result<()>;
    fn play_exit(&mut self, id: &str) -> Result<()>;
}

/// Port for hosts without animations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimation;

impl AnimationPort for NoopAnimation {
    fn play_enter(&mut self, _id: &str) -> Result<()> {
        Ok(())
    }

    fn play_exit(&mut self, _id: &str) -> Result<()> {
        Ok(())
    }
}

/// Forwards section transitions to an [`AnimationPort`]. Enter animations play
/// once per section unless `replay` is set; exit animations always play.
#[derive(Debug)]
pub struct AnimationHooks<P> {
    port: P,
    replay: bool,
    entered: HashSet<String>,
}

impl<P: AnimationPort> AnimationHooks<P> {
    pub fn new(port: P, replay: bool) -> Self {
        Self {
            port,
            replay,
            entered: HashSet::new(),
        }
    }

    /// Replay policy from `replay_enter_animations`.
    pub fn from_config(port: P, config: &TrackerConfig) -> Self {
        Self::new(port, config.replay_enter_animations)
    }

    pub fn has_entered(&self, id: &str) -> bool {
        self.entered.contains(id)
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }
}

impl<P: AnimationPort> LifecycleListener for AnimationHooks<P> {
    fn name(&self) -> &str {
        "animation-hooks"
    }

    fn on_section_enter(&mut self, id: &str) -> Result<()> {
        let first = self.entered.insert(id.to_string());
        if !first && !self.replay {
            trace!(section = id, "Enter animation already played");
            return Ok(());
        }
        self.port.play_enter(id)
    }

    fn on_section_exit(&mut self, id: &str) -> Result<()> {
        self.port.play_exit(id)
    }
}
