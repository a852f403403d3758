//! Upstream Datadog API access.
//!
//! This module handles:
//! - Endpoint paths for each upstream resource
//! - The typed fetch-and-decode client shared by every resource

pub mod client;
pub mod urls;

pub use client::{Fetched, UpstreamClient};
