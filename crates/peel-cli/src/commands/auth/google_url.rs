//! Google URL command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct GoogleUrlArgs {
    /// Where Google should send the user back to
    #[arg(long, default_value = "http://localhost:5173/auth/callback")]
    pub redirect_uri: String,
}

pub async fn run(args: GoogleUrlArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.open().await?;

    let response = session
        .client
        .google_auth_url(&args.redirect_uri)
        .await
        .context("Failed to get Google sign-in URL")?;

    println!("{}", response.auth_url);
    if let Some(user_type) = &response.user_type {
        output::note(&format!("User type: {}", user_type));
    }

    Ok(())
}
