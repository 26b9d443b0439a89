//! Auth subcommand implementations.

mod callback;
mod google_url;
mod logout;
mod refresh;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Print the Google sign-in URL
    GoogleUrl(google_url::GoogleUrlArgs),

    /// Exchange a Google authorization code for a session (login)
    Callback(callback::CallbackArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    Refresh(refresh::RefreshArgs),

    /// End the session
    Logout(logout::LogoutArgs),
}

pub async fn handle(cmd: AuthCommand, ctx: &SessionContext) -> Result<()> {
    match cmd.command {
        AuthSubcommand::GoogleUrl(args) => google_url::run(args, ctx).await,
        AuthSubcommand::Callback(args) => callback::run(args, ctx).await,
        AuthSubcommand::Whoami(args) => whoami::run(args, ctx).await,
        AuthSubcommand::Refresh(args) => refresh::run(args, ctx).await,
        AuthSubcommand::Logout(args) => logout::run(args, ctx).await,
    }
}
