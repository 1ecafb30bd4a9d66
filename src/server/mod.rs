//! Axum-based HTTP server for the promptcache service.
//!
//! This module sets up the HTTP surface in front of [`crate::service::GenerationService`]:
//! text generation, rolling request statistics, Prometheus metrics and health.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual API endpoints.
//! - `middleware`: Request ID tracking and per-route request metrics.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::CACHE_STATUS_HEADER;
pub use routes::{create_router, AppState};
