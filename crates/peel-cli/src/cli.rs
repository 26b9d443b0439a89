//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::api::ApiCommand;
use crate::commands::auth::AuthCommand;

/// Default backend used when neither `--api-url` nor `PEEL_API_URL` is set.
pub const DEFAULT_API_URL: &str = "https://peeljobs.com/api/v1";

/// PeelJobs CLI tool for API exploration.
#[derive(Parser, Debug)]
#[command(name = "peel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, global = true, env = "PEEL_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Session file (defaults to the platform data directory)
    #[arg(long, global = true, env = "PEEL_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign-in and session management
    Auth(AuthCommand),

    /// Raw authenticated API calls
    Api(ApiCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "peel",
            "auth",
            "whoami",
            "-vv",
            "--api-url",
            "http://localhost:8000/api/v1",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url, "http://localhost:8000/api/v1");
        assert!(matches!(cli.command, Commands::Auth(_)));
    }
}
