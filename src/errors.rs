use thiserror::Error;

use crate::state::counters::CounterKind;

#[derive(Error, Debug)]
pub enum CounterError {
    /// The backing file for `kind` could not be read or written.
    #[error("{kind} storage unavailable: {source}")]
    StorageUnavailable {
        kind: CounterKind,
        #[source]
        source: std::io::Error,
    },

    /// Stored content did not parse as an object of string to count.
    /// Handled inside the store by reinitializing the mapping.
    #[error("{kind} storage holds malformed data: {source}")]
    MalformedStoredData {
        kind: CounterKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid item identifier")]
    InvalidIdentifier,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = CounterError> = std::result::Result<T, E>;
