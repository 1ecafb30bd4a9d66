//! Data models for the HTTP API.
//!
//! - `api`: request/response bodies for `/generate`, `/health` and `/`.
//!
//! The `/metrics` body is [`crate::metrics::StatsSnapshot`].

// Author: kelexine (https://github.com/kelexine)

pub mod api;

pub use api::{GenerateRequest, GenerateResponse, HealthResponse, RootResponse};
