//! Scroll-synchronized section tracking.
//!
//! A page announces its content sections; the tracker decides which one the
//! reader is looking at, how far through the page they are, and notifies
//! listeners (navigation highlight, progress bar, animations) when either
//! changes. Hosts supply geometry and frame callbacks through the traits in
//! [`registry`], [`geometry`] and [`scheduler`].

pub mod bindings;
pub mod cancellation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod lifecycle;
pub mod listeners;
pub mod logging;
pub mod navigation;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod tracker;

pub use config::{TrackerConfig, load_config};
pub use error::TrackerError;
pub use geometry::{Geometry, GeometryProvider};
pub use headless::HeadlessPage;
pub use lifecycle::{EventFn, LifecycleEvent, LifecycleListener, ListenerHandle, ResolvedState};
pub use registry::{SectionDescriptor, SectionProvider, SectionRegion, SectionRegistry};
pub use scheduler::{FrameHost, FrameToken, Stimulus};
pub use tracker::{PassOutcome, SectionTracker, TrackerPhase, TrackerSnapshot};
