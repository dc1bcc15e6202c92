//! Error types for the marketplace client core.
//!
//! # Design
//! Validation failures are kept apart from serialization failures because
//! they are raised at the dispatch boundary, before any request exists.
//! Non-2xx statuses are not errors here: they are a `ResponseOutcome`
//! variant, and each command decides whether to print or raise them.

use thiserror::Error;

/// Errors produced while building requests or reading response bodies.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body was not valid JSON, or lacked a field the
    /// command needs.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// A malformed or missing command-line argument.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid ssh key: must start with 'ssh' (got {0:?})")]
    InvalidSshKey(String),

    #[error("refusing to send a private key; pass the public key instead")]
    PrivateKey,

    #[error("invalid env entry {0:?}: expected KEY=VALUE")]
    InvalidEnv(String),

    #[error("invalid amount {0}: must be a positive number")]
    InvalidAmount(f64),

    #[error("could not read onstart file {path}: {reason}")]
    OnstartFile { path: String, reason: String },
}
