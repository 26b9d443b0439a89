//! Session handling for the CLI.

pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::debug;

use peel_client::{ApiClient, ClientConfig, FileStore, LoginRedirect};
use peel_core::ApiBaseUrl;

/// Everything a command needs to build a client.
#[derive(Debug)]
pub struct SessionContext {
    base_url: ApiBaseUrl,
    session_file: Option<PathBuf>,
}

/// A client bound to the on-disk session.
pub struct CliSession {
    pub client: ApiClient,
    pub store: Arc<FileStore>,
}

impl SessionContext {
    pub fn new(api_url: &str, session_file: Option<PathBuf>) -> Result<Self> {
        let base_url = ApiBaseUrl::new(api_url).context("Invalid API URL")?;
        Ok(Self {
            base_url,
            session_file,
        })
    }

    /// Open the stored session and build a client over it.
    pub async fn open(&self) -> Result<CliSession> {
        let path = match &self.session_file {
            Some(path) => path.clone(),
            None => storage::session_path()?,
        };
        debug!(path = %path.display(), api = %self.base_url, "opening session");

        let store = Arc::new(
            FileStore::open(&path)
                .await
                .context("Failed to load session")?,
        );

        let client = ApiClient::builder(ClientConfig::new(self.base_url.clone()))
            .store(store.clone())
            .listener(|redirect: &LoginRedirect| {
                eprintln!(
                    "{} Session expired. Log in again ({}).",
                    "!".yellow(),
                    redirect
                );
            })
            .build()
            .context("Failed to create API client")?;

        Ok(CliSession { client, store })
    }

    /// Open the stored session, failing if nobody is logged in.
    pub async fn require(&self) -> Result<CliSession> {
        let session = self.open().await?;
        if !session.store.has_session().await {
            anyhow::bail!("No active session. Run 'peel auth callback' first.");
        }
        Ok(session)
    }
}
