//! Datadog API integration gateway.
//!
//! Queries the Datadog REST API, decodes each response into a typed shape,
//! and serves a flattened JSON view of it over HTTP:
//!
//! ```text
//! upstream: {"data":[{"attributes":{"monitor_identifier":{"monitor_id":42},"scope":"host:a"}}]}
//! served:   {"ids":[42],"scopes":["host:a"]}
//! ```
//!
//! Failures at any stage are answered with a single envelope,
//! `{"status": <code>, "message": <text>}`.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Error taxonomy and status mapping
//! - [`upstream`]: Typed fetch-and-decode client
//! - [`resources`]: Per-resource shapes and projections
//! - [`api`]: HTTP routes, handlers, and response writing
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod resources;
pub mod upstream;
pub mod utils;

pub use config::Config;
pub use error::{GatewayError, Result};
