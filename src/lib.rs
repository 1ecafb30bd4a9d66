// promptcache - Caching HTTP facade for a text-generation engine
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod service;
pub mod utils;
