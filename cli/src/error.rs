//! Errors that end a command with a non-zero exit.
//!
//! API-level failures (`"success": false`) never show up here: they are
//! printed and the command exits cleanly. Non-2xx statuses reach this type
//! only for commands whose policy is to raise them.

use thiserror::Error;
use vast_core::{ClientError, ValidationError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// DNS failure, refused connection, timeout.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
