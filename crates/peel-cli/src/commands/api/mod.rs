//! Raw API subcommand implementations.

mod request;
mod upload;

use anyhow::Result;
use clap::{Args, Subcommand};

use peel_client::Method;

use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct ApiCommand {
    #[command(subcommand)]
    pub command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiSubcommand {
    /// Send a GET request
    Get(request::RequestArgs),

    /// Send a POST request with a JSON body
    Post(request::RequestArgs),

    /// Send a PUT request with a JSON body
    Put(request::RequestArgs),

    /// Send a PATCH request with a JSON body
    Patch(request::RequestArgs),

    /// Send a DELETE request
    Delete(request::RequestArgs),

    /// Upload files as a multipart form
    Upload(upload::UploadArgs),
}

pub async fn handle(cmd: ApiCommand, ctx: &SessionContext) -> Result<()> {
    match cmd.command {
        ApiSubcommand::Get(args) => request::run(Method::GET, args, ctx).await,
        ApiSubcommand::Post(args) => request::run(Method::POST, args, ctx).await,
        ApiSubcommand::Put(args) => request::run(Method::PUT, args, ctx).await,
        ApiSubcommand::Patch(args) => request::run(Method::PATCH, args, ctx).await,
        ApiSubcommand::Delete(args) => request::run(Method::DELETE, args, ctx).await,
        ApiSubcommand::Upload(args) => upload::run(args, ctx).await,
    }
}

/// Parse a `key=value` argument.
pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_value("q=rust developer").unwrap(),
            ("q".to_string(), "rust developer".to_string())
        );
        assert_eq!(
            parse_key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
