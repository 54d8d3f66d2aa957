//! Frame-coalesced update scheduling.
//!
//! Scroll and resize events arrive far more often than the display refreshes.
//! The scheduler keeps at most one frame request outstanding; stimuli that
//! arrive while a frame is pending are absorbed into it.

use crate::cancellation::CancellationToken;
use tracing::trace;

/// Identifies one frame request made to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    Scroll,
    /// Extents may change even when membership does not.
    Resize,
    /// The set of sections changed.
    ContentChanged,
}

impl Stimulus {
    fn invalidates_registry(self) -> bool {
        matches!(self, Stimulus::Resize | Stimulus::ContentChanged)
    }
}

/// Host side of scheduling: frame callbacks and stimulus subscription.
///
/// When a requested frame fires, the host calls `SectionTracker::on_frame`
/// with the token returned here.
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
    /// Start forwarding scroll/resize/mutation events. Callbacks should check
    /// `teardown` before touching the tracker.
    fn attach_stimuli(&mut self, teardown: CancellationToken);
    fn detach_stimuli(&mut self);
}

/// Work unlocked by a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    /// Rebuild the registry before sampling geometry.
    pub rebuild_registry: bool,
    /// Stimuli coalesced into this pass.
    pub coalesced: u64,
}

#[derive(Debug, Default)]
pub struct UpdateScheduler {
    pending: Option<FrameToken>,
    registry_dirty: bool,
    coalesced: u64,
    passes: u64,
    torn_down: bool,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stimulus; request a frame only if none is outstanding.
    /// Returns `true` when a new frame was requested.
    pub fn stimulus<H>(&mut self, stimulus: Stimulus, host: &mut H) -> bool
    where
        H: FrameHost + ?Sized,
    {
        if self.torn_down {
            return false;
        }
        if stimulus.invalidates_registry() {
            self.registry_dirty = true;
        }
        self.coalesced += 1;
        if self.pending.is_some() {
            trace!(?stimulus, coalesced = self.coalesced, "Absorbed into pending frame");
            return false;
        }
        let token = host.request_frame();
        trace!(?stimulus, frame = token.0, "Requested frame");
        self.pending = Some(token);
        true
    }

    /// Force a registry rebuild on the next pass without requesting a frame.
    pub fn invalidate_registry(&mut self) {
        self.registry_dirty = true;
    }

    /// Claim the pending frame. Stale or foreign tokens yield `None`.
    pub fn begin_pass(&mut self, token: FrameToken) -> Option<PassTicket> {
        if self.torn_down || self.pending != Some(token) {
            trace!(frame = token.0, "Ignoring stale frame callback");
            return None;
        }
        self.pending = None;
        self.passes += 1;
        Some(PassTicket {
            rebuild_registry: std::mem::take(&mut self.registry_dirty),
            coalesced: std::mem::take(&mut self.coalesced),
        })
    }

    /// Cancel any pending frame and stop accepting stimuli. Idempotent;
    /// returns `true` only on the first call.
    pub fn teardown<H>(&mut self, host: &mut H) -> bool
    where
        H: FrameHost + ?Sized,
    {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
        host.detach_stimuli();
        self.registry_dirty = false;
        self.coalesced = 0;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// No frame outstanding and not torn down.
    pub fn is_idle(&self) -> bool {
        !self.torn_down && self.pending.is_none()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn passes_run(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHost {
        next: u64,
        requested: Vec<FrameToken>,
        cancelled: Vec<FrameToken>,
        attached: bool,
    }

    impl FrameHost for CountingHost {
        fn request_frame(&mut self) -> FrameToken {
            self.next += 1;
            let token = FrameToken(self.next);
            self.requested.push(token);
            token
        }

        fn cancel_frame(&mut self, token: FrameToken) {
            self.cancelled.push(token);
        }

        fn attach_stimuli(&mut self, _teardown: CancellationToken) {
            self.attached = true;
        }

        fn detach_stimuli(&mut self) {
            self.attached = false;
        }
    }

    #[test]
    fn many_stimuli_in_one_frame_make_one_request() {
        let mut host = CountingHost::default();
        let mut scheduler = UpdateScheduler::new();
        for _ in 0..25 {
            scheduler.stimulus(Stimulus::Scroll, &mut host);
        }
        assert_eq!(host.requested.len(), 1);
        let ticket = scheduler.begin_pass(host.requested[0]).expect("pending frame");
        assert_eq!(ticket.coalesced, 25);
        assert!(!ticket.rebuild_registry);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.passes_run(), 1);
    }

    #[test]
    fn resize_marks_registry_dirty_for_the_next_pass_only() {
        let mut host = CountingHost::default();
        let mut scheduler = UpdateScheduler::new();
        scheduler.stimulus(Stimulus::Scroll, &mut host);
        scheduler.stimulus(Stimulus::Resize, &mut host);
        let first = scheduler.begin_pass(FrameToken(1)).expect("first pass");
        assert!(first.rebuild_registry);

        scheduler.stimulus(Stimulus::Scroll, &mut host);
        let second = scheduler.begin_pass(FrameToken(2)).expect("second pass");
        assert!(!second.rebuild_registry);
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut host = CountingHost::default();
        let mut scheduler = UpdateScheduler::new();
        scheduler.stimulus(Stimulus::Scroll, &mut host);
        assert!(scheduler.begin_pass(FrameToken(99)).is_none());
        assert!(scheduler.begin_pass(FrameToken(1)).is_some());
        assert!(scheduler.begin_pass(FrameToken(1)).is_none());
    }

    #[test]
    fn teardown_cancels_pending_and_is_idempotent() {
        let mut host = CountingHost::default();
        let mut scheduler = UpdateScheduler::new();
        host.attached = true;
        scheduler.stimulus(Stimulus::ContentChanged, &mut host);

        assert!(scheduler.teardown(&mut host));
        assert!(!scheduler.teardown(&mut host));
        assert_eq!(host.cancelled, vec![FrameToken(1)]);
        assert!(!host.attached);

        assert!(!scheduler.stimulus(Stimulus::Scroll, &mut host));
        assert_eq!(host.requested.len(), 1);
        assert!(scheduler.begin_pass(FrameToken(1)).is_none());
        assert!(!scheduler.is_idle());
    }
}
