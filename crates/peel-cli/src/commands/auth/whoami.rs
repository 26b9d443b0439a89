//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the user as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.require().await?;

    let user = session
        .client
        .current_user()
        .await
        .context("Failed to fetch current user")?;

    if args.json {
        return output::json_pretty(&user);
    }

    output::field("Name", &user.display_name());
    output::field("Email", &user.email);
    output::field("Username", &user.username);
    output::field("Type", &user.user_type);
    output::field(
        "Profile",
        &format!("{}% complete", user.profile_completion_percentage),
    );
    output::field(
        "Google",
        if user.is_gp_connected {
            "connected"
        } else {
            "not connected"
        },
    );
    output::field("Joined", &user.date_joined.format("%Y-%m-%d").to_string());

    Ok(())
}
