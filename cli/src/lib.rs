//! Command-line client for the GPU marketplace API.
//!
//! Each subcommand becomes one validated [`dispatch::Invocation`], one HTTP
//! request built by `vast-core`, and one printed result.

pub mod args;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod transport;

pub use args::Cli;
pub use config::Config;
pub use dispatch::{run, Invocation};
pub use error::CliError;
pub use transport::{Transport, UreqTransport};
