//! Callback command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct CallbackArgs {
    /// Authorization code returned by Google
    #[arg(long)]
    pub code: String,

    /// Redirect URI used to obtain the code
    #[arg(long, default_value = "http://localhost:5173/auth/callback")]
    pub redirect_uri: String,
}

pub async fn run(args: CallbackArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.open().await?;

    eprintln!("{}", "Logging in...".dimmed());

    let auth = session
        .client
        .google_callback(&args.code, &args.redirect_uri)
        .await
        .context("Failed to login")?;

    if !session.store.has_session().await {
        output::warning("The server did not return tokens; nothing was saved.");
    }

    output::success("Logged in successfully");
    println!();
    output::field("Name", &auth.user.display_name());
    output::field("Email", &auth.user.email);
    if auth.is_new_user {
        output::field("New user", "yes");
    }
    if auth.requires_profile_completion {
        output::field("Profile", "incomplete");
    }
    if let Some(next) = &auth.redirect_to {
        output::field("Next", next);
    }

    Ok(())
}
