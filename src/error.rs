//! Error taxonomy for the tracker.
//!
//! None of these escape to the host page: the tracker logs them and degrades
//! to "tracking inactive". They surface as values in pass reports and from the
//! configuration loaders.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// No trackable section is registered, so tracking is disabled.
    #[error("no trackable sections registered")]
    ConfigurationEmpty,

    /// The document does not overflow the viewport.
    #[error("document height {document_height} does not exceed viewport height {viewport_height}")]
    DegenerateGeometry {
        document_height: f64,
        viewport_height: f64,
    },

    /// A lifecycle listener returned an error or panicked.
    #[error("listener `{listener}` failed on {event}: {reason}")]
    ListenerFailure {
        listener: String,
        event: String,
        reason: String,
    },

    /// The previously active section vanished in a registry rebuild.
    #[error("section `{id}` is no longer registered")]
    StaleRegistry { id: String },

    /// The tracker was torn down.
    #[error("tracker has been torn down")]
    TornDown,

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
