//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::SessionContext;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: &SessionContext) -> Result<()> {
    let session = ctx.open().await?;

    if !session.store.has_session().await {
        output::note("Not logged in.");
        return Ok(());
    }

    match session.client.logout().await {
        Ok(()) => output::success("Logged out"),
        // Local credentials are gone either way
        Err(e) => {
            output::warning(&format!("Server logout failed: {}", e));
            output::success("Logged out locally");
        }
    }

    Ok(())
}
