// CLI module for promptcache
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// promptcache - Caching HTTP facade for a text-generation engine
#[derive(Parser, Debug)]
#[command(name = "promptcache", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.promptcache/config.toml if present)
    #[arg(short, long, env = "PROMPTCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding configuration
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    /// Apply CLI overrides, the highest-precedence configuration source.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
