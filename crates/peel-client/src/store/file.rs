//! File-backed credential store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use peel_core::{
    AccessToken, CredentialStore, CredentialTransport, Error, RefreshToken, Result, TokenPair,
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: String,
}

/// Persists the token pair as JSON and sends it as a bearer header.
///
/// The file is readable only by its owner on Unix. Reads are served from
/// memory; every change is written through to disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tokens: RwLock<Option<TokenPair>>,
}

impl FileStore {
    /// Open the store at `path`, loading any session already saved there.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let tokens = match fs::read_to_string(&path).await {
            Ok(json) => {
                let stored: StoredTokens = serde_json::from_str(&json)
                    .map_err(|e| Error::storage(format!("invalid session file: {}", e)))?;
                debug!(path = %path.display(), "loaded stored session");
                Some(TokenPair::new(stored.access_token, stored.refresh_token))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(Error::storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    /// Returns the path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if a session is currently stored.
    pub async fn has_session(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    async fn write(&self, tokens: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::storage(format!("failed to create data directory: {}", e)))?;
        }

        let stored = StoredTokens {
            access_token: tokens.access.as_str().to_string(),
            refresh_token: tokens.refresh.as_str().to_string(),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        fs::write(&self.path, &json)
            .await
            .map_err(|e| Error::storage(format!("failed to write session file: {}", e)))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| Error::storage(format!("failed to restrict session file: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    fn transport(&self) -> CredentialTransport {
        CredentialTransport::Bearer
    }

    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.tokens.read().await.as_ref().map(|t| t.access.clone()))
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self.tokens.read().await.as_ref().map(|t| t.refresh.clone()))
    }

    async fn save(&self, tokens: TokenPair) -> Result<()> {
        let mut current = self.tokens.write().await;
        self.write(&tokens).await?;
        *current = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut current = self.tokens.write().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::storage(format!(
                    "failed to remove session file: {}",
                    e
                )));
            }
        }
        *current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("session.json")).await.unwrap();
        assert!(!store.has_session().await);
        assert!(store.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path).await.unwrap();
        store.save(TokenPair::new("a1", "r1")).await.unwrap();

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.access_token().await.unwrap(),
            Some(AccessToken::new("a1"))
        );
        assert_eq!(
            reopened.refresh_token().await.unwrap(),
            Some(RefreshToken::new("r1"))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path).await.unwrap();
        store.save(TokenPair::new("a1", "r1")).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path).await.unwrap();
        store.save(TokenPair::new("a1", "r1")).await.unwrap();

        store.clear().await.unwrap();
        assert!(!path.exists());
        assert!(!store.has_session().await);

        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }
}
