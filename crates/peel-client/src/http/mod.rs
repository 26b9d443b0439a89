//! HTTP plumbing.
//!
//! This module provides the request description type and the transport that
//! dispatches it against the REST API.

pub(crate) mod client;
mod request;

pub(crate) use client::HttpClient;
pub use request::{ApiRequest, FormData, RequestBody};
