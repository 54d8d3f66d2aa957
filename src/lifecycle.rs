//! Lifecycle events, listeners and the emitter that owns `ResolvedState`.

use crate::error::TrackerError;
use crate::progress::progress_changed;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use tracing::{debug, warn};
use ts_rs::TS;

/// The single shared fact the tracker maintains.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolvedState {
    /// `None` until the first resolution and after teardown.
    pub active_id: Option<String>,
    pub progress_percent: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum LifecycleEvent {
    SectionExit { id: String },
    SectionEnter { id: String },
    ProgressChanged { percent: f64 },
    VisibilityChanged { visible: bool },
}

impl LifecycleEvent {
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleEvent::SectionExit { .. } => "section_exit",
            LifecycleEvent::SectionEnter { .. } => "section_enter",
            LifecycleEvent::ProgressChanged { .. } => "progress_changed",
            LifecycleEvent::VisibilityChanged { .. } => "visibility_changed",
        }
    }
}

/// Events implied by moving from `old` to `new`, in delivery order:
/// exit, enter, progress, visibility.
pub fn diff(old: &ResolvedState, new: &ResolvedState, progress_epsilon: f64) -> Vec<LifecycleEvent> {
    let mut events = Vec::with_capacity(4);
    if old.active_id != new.active_id {
        if let Some(id) = &old.active_id {
            events.push(LifecycleEvent::SectionExit { id: id.clone() });
        }
        if let Some(id) = &new.active_id {
            events.push(LifecycleEvent::SectionEnter { id: id.clone() });
        }
    }
    if progress_changed(old.progress_percent, new.progress_percent, progress_epsilon) {
        events.push(LifecycleEvent::ProgressChanged {
            percent: new.progress_percent,
        });
    }
    if old.visible != new.visible {
        events.push(LifecycleEvent::VisibilityChanged {
            visible: new.visible,
        });
    }
    events
}

/// Outbound contract. Every method defaults to a no-op.
pub trait LifecycleListener {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn on_section_enter(&mut self, _id: &str) -> Result<()> {
        Ok(())
    }

    fn on_section_exit(&mut self, _id: &str) -> Result<()> {
        Ok(())
    }

    fn on_progress(&mut self, _percent: f64) -> Result<()> {
        Ok(())
    }

    fn on_visibility_change(&mut self, _visible: bool) -> Result<()> {
        Ok(())
    }
}

/// Lets the host keep a handle on a renderer it registered.
impl<L> LifecycleListener for Rc<RefCell<L>>
where
    L: LifecycleListener + ?Sized,
{
    fn name(&self) -> &str {
        std::any::type_name::<L>()
    }

    fn on_section_enter(&mut self, id: &str) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| anyhow!("listener is already borrowed"))?
            .on_section_enter(id)
    }

    fn on_section_exit(&mut self, id: &str) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| anyhow!("listener is already borrowed"))?
            .on_section_exit(id)
    }

    fn on_progress(&mut self, percent: f64) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| anyhow!("listener is already borrowed"))?
            .on_progress(percent)
    }

    fn on_visibility_change(&mut self, visible: bool) -> Result<()> {
        self.try_borrow_mut()
            .map_err(|_| anyhow!("listener is already borrowed"))?
            .on_visibility_change(visible)
    }
}

/// Adapts a closure over whole events, e.g. a bridge posting JSON to a page.
pub struct EventFn<F> {
    name: String,
    f: F,
}

impl<F> EventFn<F>
where
    F: FnMut(&LifecycleEvent) -> Result<()>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> LifecycleListener for EventFn<F>
where
    F: FnMut(&LifecycleEvent) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_section_enter(&mut self, id: &str) -> Result<()> {
        (self.f)(&LifecycleEvent::SectionEnter { id: id.to_string() })
    }

    fn on_section_exit(&mut self, id: &str) -> Result<()> {
        (self.f)(&LifecycleEvent::SectionExit { id: id.to_string() })
    }

    fn on_progress(&mut self, percent: f64) -> Result<()> {
        (self.f)(&LifecycleEvent::ProgressChanged { percent })
    }

    fn on_visibility_change(&mut self, visible: bool) -> Result<()> {
        (self.f)(&LifecycleEvent::VisibilityChanged { visible })
    }
}

fn deliver(listener: &mut dyn LifecycleListener, event: &LifecycleEvent) -> Result<()> {
    match event {
        LifecycleEvent::SectionExit { id } => listener.on_section_exit(id),
        LifecycleEvent::SectionEnter { id } => listener.on_section_enter(id),
        LifecycleEvent::ProgressChanged { percent } => listener.on_progress(*percent),
        LifecycleEvent::VisibilityChanged { visible } => listener.on_visibility_change(*visible),
    }
}

/// Disposer returned by [`ListenerRegistry::subscribe`].
#[must_use = "dropping the handle keeps the listener registered; call `dispose` to remove it"]
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: u64,
    disposed: Rc<Cell<bool>>,
}

impl ListenerHandle {
    /// Stop delivery to this listener. Safe to call more than once, and from
    /// inside a callback.
    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

struct Entry {
    id: u64,
    name: String,
    listener: Box<dyn LifecycleListener>,
    disposed: Rc<Cell<bool>>,
}

/// Outcome of delivering one pass's events.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub deliveries: usize,
    pub failures: Vec<TrackerError>,
}

#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<Entry>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<L>(&mut self, listener: L) -> ListenerHandle
    where
        L: LifecycleListener + 'static,
    {
        self.prune();
        self.next_id += 1;
        let disposed = Rc::new(Cell::new(false));
        let name = listener.name().to_string();
        debug!(listener = %name, id = self.next_id, "Subscribed lifecycle listener");
        self.entries.push(Entry {
            id: self.next_id,
            name,
            listener: Box::new(listener),
            disposed: Rc::clone(&disposed),
        });
        ListenerHandle {
            id: self.next_id,
            disposed,
        }
    }

    /// Live listeners. Disposed entries linger until the next `subscribe` or
    /// `dispatch` drops them.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.disposed.get()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispose and drop every listener.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            entry.disposed.set(true);
        }
    }

    /// Deliver each event to every live listener before the next event.
    /// Failures are isolated per listener.
    pub fn dispatch(&mut self, events: &[LifecycleEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.prune();
        for event in events {
            for entry in self.entries.iter_mut() {
                if entry.disposed.get() {
                    continue;
                }
                let listener = entry.listener.as_mut();
                let outcome = catch_unwind(AssertUnwindSafe(|| deliver(listener, event)));
                let reason = match outcome {
                    Ok(Ok(())) => {
                        report.deliveries += 1;
                        continue;
                    }
                    Ok(Err(err)) => format!("{err:#}"),
                    Err(panic) => panic_message(panic.as_ref()),
                };
                warn!(
                    listener = %entry.name,
                    id = entry.id,
                    event = event.label(),
                    %reason,
                    "Lifecycle listener failed; continuing with the rest"
                );
                report.failures.push(TrackerError::ListenerFailure {
                    listener: entry.name.clone(),
                    event: event.label().to_string(),
                    reason,
                });
            }
        }
        self.prune();
        report
    }

    fn prune(&mut self) {
        self.entries.retain(|e| !e.disposed.get());
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked with unknown payload".to_string()
    }
}

/// Events and delivery outcome of one committed pass.
#[derive(Debug, Default)]
pub struct Emission {
    pub events: Vec<LifecycleEvent>,
    pub report: DispatchReport,
}

/// Owns `ResolvedState`; the only place it changes.
pub struct LifecycleEmitter {
    state: ResolvedState,
    listeners: ListenerRegistry,
    progress_epsilon: f64,
    /// Last percent delivered to listeners; progress is diffed against this,
    /// not the previous pass, so sub-epsilon steps accumulate.
    reported_progress: f64,
}

impl LifecycleEmitter {
    pub fn new(progress_epsilon: f64) -> Self {
        Self {
            state: ResolvedState::default(),
            listeners: ListenerRegistry::new(),
            progress_epsilon,
            reported_progress: 0.0,
        }
    }

    pub fn state(&self) -> &ResolvedState {
        &self.state
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn subscribe<L>(&mut self, listener: L) -> ListenerHandle
    where
        L: LifecycleListener + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Swap in a fully computed state, then notify listeners.
    pub fn commit(&mut self, next: ResolvedState) -> Emission {
        let baseline = ResolvedState {
            progress_percent: self.reported_progress,
            ..self.state.clone()
        };
        let events = diff(&baseline, &next, self.progress_epsilon);
        if events
            .iter()
            .any(|event| matches!(event, LifecycleEvent::ProgressChanged { .. }))
        {
            self.reported_progress = next.progress_percent;
        }
        self.state = next;
        if events.is_empty() {
            return Emission::default();
        }
        let report = self.listeners.dispatch(&events);
        Emission { events, report }
    }

    /// Return to "none" without notifying anyone.
    pub fn forget_state(&mut self) {
        self.state = ResolvedState::default();
        self.reported_progress = 0.0;
    }

    /// Percent listeners last saw; within `progress_epsilon` of the state.
    pub fn reported_progress(&self) -> f64 {
        self.reported_progress
    }

    /// Drop all listeners and forget state without emitting anything.
    pub fn reset(&mut self) {
        self.listeners.clear();
        self.forget_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<LifecycleEvent>,
    }

    impl LifecycleListener for Recorder {
        fn on_section_enter(&mut self, id: &str) -> Result<()> {
            self.seen.push(LifecycleEvent::SectionEnter { id: id.to_string() });
            Ok(())
        }

        fn on_section_exit(&mut self, id: &str) -> Result<()> {
            self.seen.push(LifecycleEvent::SectionExit { id: id.to_string() });
            Ok(())
        }

        fn on_progress(&mut self, percent: f64) -> Result<()> {
            self.seen.push(LifecycleEvent::ProgressChanged { percent });
            Ok(())
        }

        fn on_visibility_change(&mut self, visible: bool) -> Result<()> {
            self.seen.push(LifecycleEvent::VisibilityChanged { visible });
            Ok(())
        }
    }

    struct Failing;

    impl LifecycleListener for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_section_enter(&mut self, id: &str) -> Result<()> {
            Err(anyhow!("cannot animate {id}"))
        }
    }

    struct Panicking;

    impl LifecycleListener for Panicking {
        fn on_progress(&mut self, _percent: f64) -> Result<()> {
            panic!("renderer exploded");
        }
    }

    fn state(id: Option<&str>, pct: f64, visible: bool) -> ResolvedState {
        ResolvedState {
            active_id: id.map(str::to_string),
            progress_percent: pct,
            visible,
        }
    }

    #[test]
    fn diff_orders_exit_enter_progress_visibility() {
        let events = diff(
            &state(Some("about"), 10.0, false),
            &state(Some("projects"), 40.0, true),
            0.01,
        );
        assert_eq!(
            events,
            vec![
                LifecycleEvent::SectionExit { id: "about".into() },
                LifecycleEvent::SectionEnter {
                    id: "projects".into()
                },
                LifecycleEvent::ProgressChanged { percent: 40.0 },
                LifecycleEvent::VisibilityChanged { visible: true },
            ]
        );
    }

    #[test]
    fn first_resolution_has_no_exit() {
        let events = diff(&ResolvedState::default(), &state(Some("hero"), 0.0, false), 0.01);
        assert_eq!(events, vec![LifecycleEvent::SectionEnter { id: "hero".into() }]);
    }

    #[test]
    fn unchanged_state_and_jitter_emit_nothing() {
        let old = state(Some("skills"), 33.333, true);
        let new = state(Some("skills"), 33.338, true);
        assert!(diff(&old, &new, 0.01).is_empty());
    }

    #[test]
    fn sub_epsilon_steps_accumulate_until_progress_is_reported() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut emitter = LifecycleEmitter::new(0.01);
        let _recorder = emitter.subscribe(Rc::clone(&recorder));

        for step in 1..=200u32 {
            emitter.commit(state(Some("a"), f64::from(step) * 0.004, false));
            let lag = emitter.state().progress_percent - emitter.reported_progress();
            assert!(lag <= 0.01 + 1e-12, "step {step} lags by {lag}");
        }

        let reported: Vec<f64> = recorder
            .borrow()
            .seen
            .iter()
            .filter_map(|event| match event {
                LifecycleEvent::ProgressChanged { percent } => Some(*percent),
                _ => None,
            })
            .collect();
        assert!(reported.len() > 50, "only {} progress events", reported.len());
        assert!(reported.windows(2).all(|pair| pair[1] - pair[0] > 0.01));
        let last = reported.last().copied().expect("progress reported");
        assert!((0.8 - last).abs() <= 0.01 + 1e-12, "last reported {last}");
    }

    #[test]
    fn forgetting_state_resets_the_reported_progress() {
        let mut emitter = LifecycleEmitter::new(0.01);
        emitter.commit(state(Some("a"), 40.0, true));
        assert_eq!(emitter.reported_progress(), 40.0);
        emitter.forget_state();
        assert_eq!(emitter.reported_progress(), 0.0);
        let emission = emitter.commit(state(Some("a"), 40.0, true));
        assert!(emission
            .events
            .contains(&LifecycleEvent::ProgressChanged { percent: 40.0 }));
    }

    #[test]
    fn disposed_entries_are_dropped_on_the_next_subscribe() {
        let mut registry = ListenerRegistry::new();
        for _ in 0..10 {
            let handle = registry.subscribe(EventFn::new("short-lived", |_event: &LifecycleEvent| Ok(())));
            handle.dispose();
        }
        assert!(registry.entries.len() <= 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn failing_and_panicking_listeners_do_not_block_others() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut emitter = LifecycleEmitter::new(0.01);
        let _failing = emitter.subscribe(Failing);
        let _panicking = emitter.subscribe(Panicking);
        let _recorder = emitter.subscribe(Rc::clone(&recorder));

        let emission = emitter.commit(state(Some("hero"), 5.0, false));

        assert_eq!(emission.events.len(), 2);
        assert_eq!(recorder.borrow().seen, emission.events);
        assert_eq!(emission.report.failures.len(), 2);
        assert!(emission.report.failures.iter().all(|f| matches!(
            f,
            TrackerError::ListenerFailure { .. }
        )));
        assert_eq!(emitter.state().active_id.as_deref(), Some("hero"));
    }

    #[test]
    fn disposed_listener_stops_receiving() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut registry = ListenerRegistry::new();
        let handle = registry.subscribe(Rc::clone(&recorder));
        registry.dispatch(&[LifecycleEvent::VisibilityChanged { visible: true }]);
        handle.dispose();
        handle.dispose();
        registry.dispatch(&[LifecycleEvent::VisibilityChanged { visible: false }]);

        assert_eq!(recorder.borrow().seen.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn listener_can_dispose_itself_mid_dispatch() {
        let handle_slot: Rc<RefCell<Option<ListenerHandle>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));
        let mut registry = ListenerRegistry::new();
        let slot = Rc::clone(&handle_slot);
        let counter = Rc::clone(&calls);
        let handle = registry.subscribe(EventFn::new("one-shot", move |_event: &LifecycleEvent| {
            counter.set(counter.get() + 1);
            if let Some(handle) = slot.borrow().as_ref() {
                handle.dispose();
            }
            Ok(())
        }));
        *handle_slot.borrow_mut() = Some(handle);

        registry.dispatch(&[
            LifecycleEvent::SectionEnter { id: "a".into() },
            LifecycleEvent::ProgressChanged { percent: 1.0 },
        ]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn reset_clears_listeners_and_state() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut emitter = LifecycleEmitter::new(0.01);
        let handle = emitter.subscribe(Rc::clone(&recorder));
        emitter.commit(state(Some("hero"), 0.0, false));
        emitter.reset();

        assert!(handle.is_disposed());
        assert_eq!(emitter.state(), &ResolvedState::default());
        emitter.commit(state(Some("about"), 20.0, true));
        assert_eq!(recorder.borrow().seen.len(), 1);
    }

    #[test]
    fn events_serialize_with_a_kind_tag() {
        let json = serde_json::to_string(&LifecycleEvent::SectionEnter { id: "contact".into() })
            .expect("serialize event");
        assert_eq!(json, r#"{"kind":"section_enter","id":"contact"}"#);
    }
}
