//! Error types for routing operations

use std::io;
use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RouteError>;

/// Errors that can occur while resolving, connecting, or restoring ports
#[derive(Debug, Error)]
pub enum RouteError {
    /// Token does not name an existing client/port
    #[error("invalid address '{0}'")]
    AddressNotFound(String),

    /// Sender and destination are already connected
    #[error("connection is already subscribed")]
    AlreadySubscribed,

    /// No connection between sender and destination
    #[error("no subscription is found")]
    NotSubscribed,

    /// The sequencer refused the request
    #[error("subscription failed ({0})")]
    SubscriptionFailed(String),

    /// Snapshot document could not be parsed
    #[error("snapshot parsing failed: {0}")]
    SnapshotFormat(#[from] toml::de::Error),

    /// Snapshot document could not be written
    #[error("snapshot encoding failed: {0}")]
    SnapshotEncode(#[from] toml::ser::Error),

    /// Listing could not be rendered as JSON
    #[error("json encoding failed: {0}")]
    JsonEncode(#[from] serde_json::Error),

    /// The sequencer could not be opened
    #[error("can't open sequencer: {0}")]
    SequencerUnavailable(String),

    /// Failed to read a file
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Settings file is malformed
    #[error("invalid settings in '{path}': {source}")]
    Config {
        /// Path to the settings file
        path: String,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },
}
