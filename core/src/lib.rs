//! Network-free client core for the GPU marketplace API.
//!
//! # Overview
//! Builds `HttpRequest` values and classifies `HttpResponse` values without
//! touching the network (host-does-IO pattern). The CLI executes the actual
//! HTTP round-trip, so everything here is deterministic and testable.
//!
//! # Design
//! - `MarketClient` is stateless. It holds only the base URL and API key.
//! - Each marketplace action has a `build_*` method. All responses go through
//!   one interpreter, [`interpret`], which yields a [`ResponseOutcome`].
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod format;
pub mod http;
pub mod response;
pub mod types;

pub use client::{MarketClient, DEFAULT_BASE_URL};
pub use error::{ClientError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{interpret, parse_body, ResponseOutcome, UNKNOWN_ERROR};
pub use types::{
    CreateInstance, CreatedContract, Instance, InstanceList, Label, Prepay, PrepayReceipt, RunState, Runtype,
    SshKey, StateChange,
};
