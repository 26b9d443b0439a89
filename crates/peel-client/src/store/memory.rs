//! In-memory credential store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use peel_core::{
    AccessToken, CredentialStore, CredentialTransport, RefreshToken, Result, TokenPair,
};

/// Keeps the token pair in memory and sends it as a bearer header.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `tokens`.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
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
        *self.tokens.write().await = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_clear() {
        let store = MemoryStore::new();
        assert!(store.access_token().await.unwrap().is_none());

        store.save(TokenPair::new("a1", "r1")).await.unwrap();
        assert_eq!(
            store.access_token().await.unwrap(),
            Some(AccessToken::new("a1"))
        );
        assert_eq!(
            store.refresh_token().await.unwrap(),
            Some(RefreshToken::new("r1"))
        );

        store.clear().await.unwrap();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }
}
