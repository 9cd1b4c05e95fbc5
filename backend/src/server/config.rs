//! Runtime configuration for the HTTP server binary.

use std::net::SocketAddr;

use clap::Parser;

/// Command-line configuration for the incident manager server.
#[derive(Debug, Clone, Parser)]
#[command(name = "incident-manager", about = "Incident manager HTTP server")]
pub struct ServerConfig {
    /// Socket address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Emit logs as JSON (the default in deployments); plain text otherwise.
    #[arg(
        long,
        env = "LOG_JSON",
        default_value_t = true,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub log_json: bool,
}
