//! The section tracker: one instance per page view.
//!
//! Owns the registry, the scheduler and the lifecycle emitter. The host feeds
//! it stimuli and frame callbacks; each claimed frame runs one pass:
//! rebuild the registry if dirty, sample geometry, resolve, compute progress,
//! commit and emit.

use crate::cancellation::CancellationToken;
use crate::config::{ResolverTuning, TrackerConfig};
use crate::error::TrackerError;
use crate::geometry::{Geometry, GeometryProvider};
use crate::lifecycle::{
    LifecycleEmitter, LifecycleEvent, LifecycleListener, ListenerHandle, ResolvedState,
};
use crate::progress::{is_visible, progress};
use crate::registry::{SectionDescriptor, SectionProvider, SectionRegistry};
use crate::resolver::{ResolutionRule, resolve_section};
use crate::scheduler::{FrameHost, FrameToken, Stimulus, UpdateScheduler};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerPhase {
    Uninitialized,
    Tracking(String),
}

/// Result of a frame callback.
#[derive(Debug)]
pub enum PassOutcome {
    /// The token was not the pending frame, or the tracker is torn down.
    Stale,
    /// No trackable sections; nothing was emitted.
    Disabled,
    Completed(PassSummary),
}

impl PassOutcome {
    pub fn summary(&self) -> Option<&PassSummary> {
        match self {
            PassOutcome::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct PassSummary {
    pub geometry: Geometry,
    pub state: ResolvedState,
    pub rule: ResolutionRule,
    pub events: Vec<LifecycleEvent>,
    /// Listener failures, isolated during delivery.
    pub failures: Vec<TrackerError>,
    /// Tolerated conditions noticed during the pass.
    pub notes: Vec<TrackerError>,
    pub rebuilt_registry: bool,
    pub coalesced: u64,
}

/// Serializable view for debugging overlays and the TS frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrackerSnapshot {
    pub state: ResolvedState,
    pub sections: Vec<SectionDescriptor>,
    pub terminal_section: Option<String>,
    pub tracking: bool,
    #[ts(type = "number")]
    pub passes: u64,
}

pub struct SectionTracker<H> {
    host: H,
    config: TrackerConfig,
    tuning: ResolverTuning,
    registry: SectionRegistry,
    scheduler: UpdateScheduler,
    emitter: LifecycleEmitter,
    phase: TrackerPhase,
    teardown: CancellationToken,
    started: bool,
}

impl<H> SectionTracker<H>
where
    H: SectionProvider + GeometryProvider + FrameHost,
{
    pub fn new(host: H, config: TrackerConfig) -> Self {
        Self {
            host,
            tuning: config.resolver_tuning(),
            emitter: LifecycleEmitter::new(config.progress_epsilon),
            config,
            registry: SectionRegistry::default(),
            scheduler: UpdateScheduler::new(),
            phase: TrackerPhase::Uninitialized,
            teardown: CancellationToken::new(),
            started: false,
        }
    }

    /// Register a listener. After teardown the returned handle is already
    /// disposed and the listener is dropped.
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerHandle
    where
        L: LifecycleListener + 'static,
    {
        let handle = self.emitter.subscribe(listener);
        if self.teardown.is_cancelled() {
            handle.dispose();
        }
        handle
    }

    /// Attach to the host, build the registry and schedule the first pass.
    pub fn start(&mut self) -> Result<(), TrackerError> {
        self.teardown.check_cancelled()?;
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.host.attach_stimuli(self.teardown.clone());
        self.rebuild_registry();
        if self.registry.is_empty() {
            debug!(reason = %TrackerError::ConfigurationEmpty, "Tracking disabled until sections appear");
        }
        info!(sections = self.registry.len(), "Section tracking started");
        self.scheduler.stimulus(Stimulus::Scroll, &mut self.host);
        Ok(())
    }

    /// Forward a host stimulus. Returns `true` if a new frame was requested.
    pub fn on_stimulus(&mut self, stimulus: Stimulus) -> bool {
        if !self.started || self.teardown.is_cancelled() {
            return false;
        }
        self.scheduler.stimulus(stimulus, &mut self.host)
    }

    /// Run the pass for a frame the host fired.
    pub fn on_frame(&mut self, token: FrameToken) -> PassOutcome {
        if self.teardown.is_cancelled() {
            return PassOutcome::Stale;
        }
        let Some(ticket) = self.scheduler.begin_pass(token) else {
            return PassOutcome::Stale;
        };
        if ticket.rebuild_registry {
            self.rebuild_registry();
        }

        if self.registry.is_empty() {
            if self.phase != TrackerPhase::Uninitialized {
                debug!(reason = %TrackerError::ConfigurationEmpty, "All sections vanished; tracking disabled");
                self.phase = TrackerPhase::Uninitialized;
                self.emitter.forget_state();
            }
            return PassOutcome::Disabled;
        }

        let mut notes = Vec::new();
        let geometry = Geometry::sample(&self.host);
        if geometry.is_degenerate() {
            let note = TrackerError::DegenerateGeometry {
                document_height: geometry.document_height,
                viewport_height: geometry.viewport_height,
            };
            trace!(%note, "Progress forced to zero");
            notes.push(note);
        }

        let previous = self.emitter.state().active_id.clone();
        if let Some(id) = previous.as_deref().filter(|id| !self.registry.contains(id)) {
            let note = TrackerError::StaleRegistry { id: id.to_string() };
            debug!(%note, "Previous section dropped by registry rebuild");
            notes.push(note);
        }

        let Some(resolution) =
            resolve_section(&self.registry, &geometry, previous.as_deref(), &self.tuning)
        else {
            return PassOutcome::Disabled;
        };
        let rule = resolution.rule;
        let next = ResolvedState {
            active_id: Some(resolution.section.id.clone()),
            progress_percent: progress(&geometry),
            visible: is_visible(&geometry, self.config.visibility_threshold_px),
        };
        trace!(
            scroll = geometry.scroll_offset,
            active = ?next.active_id,
            ?rule,
            progress = next.progress_percent,
            "Resolved pass"
        );

        let emission = self.emitter.commit(next);
        let state = self.emitter.state().clone();
        if let Some(id) = state.active_id.as_ref() {
            if !matches!(&self.phase, TrackerPhase::Tracking(current) if current == id) {
                debug!(from = ?self.phase, to = %id, ?rule, "Active section changed");
                self.phase = TrackerPhase::Tracking(id.clone());
            }
        }

        PassOutcome::Completed(PassSummary {
            geometry,
            state,
            rule,
            events: emission.events,
            failures: emission.report.failures,
            notes,
            rebuilt_registry: ticket.rebuild_registry,
            coalesced: ticket.coalesced,
        })
    }

    /// Cancel pending work, detach from the host and drop listeners.
    /// Idempotent; returns `true` only on the first call.
    pub fn teardown(&mut self) -> bool {
        self.teardown.cancel();
        if !self.scheduler.teardown(&mut self.host) {
            return false;
        }
        self.emitter.reset();
        self.phase = TrackerPhase::Uninitialized;
        info!(passes = self.scheduler.passes_run(), "Section tracking torn down");
        true
    }

    fn rebuild_registry(&mut self) {
        self.registry = SectionRegistry::build(&self.host, self.config.terminal_section.as_deref());
    }

    pub fn state(&self) -> &ResolvedState {
        self.emitter.state()
    }

    pub fn phase(&self) -> &TrackerPhase {
        &self.phase
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Token the host can check from its own callbacks.
    pub fn teardown_token(&self) -> CancellationToken {
        self.teardown.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.listeners().len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            state: self.emitter.state().clone(),
            sections: self.registry.sections().to_vec(),
            terminal_section: self.registry.terminal().map(|s| s.id.clone()),
            tracking: matches!(self.phase, TrackerPhase::Tracking(_)),
            passes: self.scheduler.passes_run(),
        }
    }
}

impl TrackerSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
