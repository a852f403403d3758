//! HTTP API module: resource routes, health, metrics, and API docs.

pub mod docs;
pub mod handlers;
pub mod response;
pub mod routes;

pub use handlers::AppState;
pub use response::{write_json, ErrorEnvelope};
pub use routes::create_router;
