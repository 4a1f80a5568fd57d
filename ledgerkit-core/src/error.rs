//! Error taxonomy for ledgerkit operations.
//!
//! Every failure surfaced to callers is one of these kinds, carrying enough
//! detail for a user-facing message. Variants are `Clone + PartialEq` so they
//! can be stored in cache entries and fanned out to attached readers.

use thiserror::Error;

/// Failure of a data-access operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// No response received; the caller may retry.
    #[error("network error: {message}")]
    Network { message: String },

    /// The session was rejected by the service. The credential has already
    /// been cleared; the UI shell should redirect to sign-in.
    #[error("session rejected by the service")]
    AuthRejected,

    /// Business or validation failure reported by the service, surfaced
    /// verbatim and never retried automatically.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// A mutation with an overlapping affected-key set is still pending.
    /// Client-side guard, not a server fact.
    #[error("operation already in progress")]
    AlreadyInFlight,

    /// A 2xx body did not match the expected shape.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Durable credential storage failed.
    #[error("credential storage error: {message}")]
    Storage { message: String },
}

impl ClientError {
    /// Build a `Decode` error from any serde failure.
    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

/// Failure to parse a textual resource key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid resource key: {input:?}")]
pub struct ParseKeyError {
    pub input: String,
}
