//! Credential store trait.

use async_trait::async_trait;

use crate::{AccessToken, RefreshToken, Result, TokenPair};

/// How credentials travel to the backend.
///
/// A deployment picks one; the two are never mixed on the same client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialTransport {
    /// `Authorization: Bearer <access token>` read from client-side storage.
    Bearer,
    /// HTTP-only cookies managed by the server and replayed by a cookie jar.
    Cookie,
}

/// Where a client keeps its session credentials.
///
/// Cookie-backed stores cannot read the tokens back (the cookies are
/// HTTP-only), so their getters return `None` and the transport carries the
/// credentials instead.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns how credentials from this store are transmitted.
    fn transport(&self) -> CredentialTransport;

    /// Returns the current access token, if one is readable.
    async fn access_token(&self) -> Result<Option<AccessToken>>;

    /// Returns the current refresh token, if one is readable.
    async fn refresh_token(&self) -> Result<Option<RefreshToken>>;

    /// Replace the stored credentials.
    async fn save(&self, tokens: TokenPair) -> Result<()>;

    /// Forget all stored credentials.
    async fn clear(&self) -> Result<()>;
}
