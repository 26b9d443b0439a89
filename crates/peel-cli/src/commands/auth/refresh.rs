//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.require().await?;

    eprintln!("{}", "Refreshing session...".dimmed());

    // The store writes the new tokens through to disk
    session
        .client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("Session", &session.store.path().display().to_string());

    Ok(())
}
