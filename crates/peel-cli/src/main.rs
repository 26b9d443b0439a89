//! peel - CLI tool for exploring the PeelJobs REST API.
//!
//! This is a thin wrapper over the `peel-client` library, intended for
//! manual exploration and debugging against a PeelJobs backend.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{api, auth};
use session::SessionContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    let ctx = SessionContext::new(&cli.api_url, cli.session_file.clone())?;

    match cli.command {
        Commands::Auth(auth_cmd) => auth::handle(auth_cmd, &ctx).await,
        Commands::Api(api_cmd) => api::handle(api_cmd, &ctx).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output stays pipeable
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
