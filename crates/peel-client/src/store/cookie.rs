//! Cookie-jar credential store.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore as _, Jar};
use url::Url;

use peel_core::{
    AccessToken, ApiBaseUrl, CredentialStore, CredentialTransport, RefreshToken, Result,
    TokenPair,
};

/// Names and scope of the session cookies set by the backend.
#[derive(Debug, Clone)]
pub struct CookieNames {
    pub access: String,
    pub refresh: String,
    /// The `Path` the backend sets the cookies with. Clearing only expires
    /// cookies under the same path.
    pub path: String,
}

impl CookieNames {
    /// Use `path` as the cookie scope instead of `/`.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl Default for CookieNames {
    fn default() -> Self {
        Self {
            access: "access_token".to_string(),
            refresh: "refresh_token".to_string(),
            path: "/".to_string(),
        }
    }
}

/// Relies on HTTP-only cookies replayed by a shared cookie jar.
///
/// The server sets and rotates the cookies; the client never reads them.
/// Hand the store to [`crate::ApiClientBuilder::cookie_store`] so the jar is
/// installed into the HTTP client.
#[derive(Debug, Clone)]
pub struct CookieStore {
    jar: Arc<Jar>,
    scope: Url,
    names: CookieNames,
}

impl CookieStore {
    /// Create a store with an empty jar scoped to `base`'s origin.
    pub fn new(base: &ApiBaseUrl) -> Self {
        Self::with_names(base, CookieNames::default())
    }

    /// Create a store using custom cookie names.
    pub fn with_names(base: &ApiBaseUrl, mut names: CookieNames) -> Self {
        if !names.path.starts_with('/') {
            names.path.insert(0, '/');
        }
        let mut scope = base.origin();
        scope.set_path(&names.path);

        Self {
            jar: Arc::new(Jar::default()),
            scope,
            names,
        }
    }

    /// Returns the jar to install into the HTTP client.
    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Returns true if the jar holds a cookie called `name` under the
    /// configured path.
    pub fn has_cookie(&self, name: &str) -> bool {
        let Some(header) = self.jar.cookies(&self.scope) else {
            return false;
        };
        let Ok(header) = header.to_str() else {
            return false;
        };
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(cookie, _)| cookie == name)
    }

    /// Returns true if the jar holds a refresh cookie.
    pub fn has_session(&self) -> bool {
        self.has_cookie(&self.names.refresh)
    }

    fn set(&self, name: &str, value: &str) {
        self.jar.add_cookie_str(
            &format!("{}={}; Path={}; HttpOnly", name, value, self.names.path),
            &self.scope,
        );
    }

    fn expire(&self, name: &str) {
        self.jar.add_cookie_str(
            &format!("{}=; Path={}; Max-Age=0", name, self.names.path),
            &self.scope,
        );
    }
}

#[async_trait]
impl CredentialStore for CookieStore {
    fn transport(&self) -> CredentialTransport {
        CredentialTransport::Cookie
    }

    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(None)
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(None)
    }

    /// Seed the jar, e.g. with tokens returned in a login response body.
    async fn save(&self, tokens: TokenPair) -> Result<()> {
        self.set(&self.names.access, tokens.access.as_str());
        self.set(&self.names.refresh, tokens.refresh.as_str());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.expire(&self.names.access);
        self.expire(&self.names.refresh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CookieStore {
        CookieStore::new(&ApiBaseUrl::new("https://peeljobs.com/api/v1").unwrap())
    }

    #[tokio::test]
    async fn tokens_are_not_readable() {
        let store = store();
        store.save(TokenPair::new("a1", "r1")).await.unwrap();

        assert_eq!(store.transport(), CredentialTransport::Cookie);
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
        assert!(store.has_cookie("access_token"));
        assert!(store.has_session());
    }

    #[tokio::test]
    async fn clear_expires_cookies() {
        let store = store();
        store.save(TokenPair::new("a1", "r1")).await.unwrap();

        store.clear().await.unwrap();
        assert!(!store.has_cookie("access_token"));
        assert!(!store.has_session());
    }

    #[tokio::test]
    async fn clear_expires_cookies_under_custom_path() {
        let base = ApiBaseUrl::new("https://peeljobs.com/api/v1").unwrap();
        let store = CookieStore::with_names(&base, CookieNames::default().with_path("api/"));

        // As the backend would set it on a login response
        let login = Url::parse("https://peeljobs.com/api/v1/auth/google/callback/").unwrap();
        store
            .jar()
            .add_cookie_str("refresh_token=r1; Path=/api/; HttpOnly", &login);
        assert!(store.has_session());

        let root = Url::parse("https://peeljobs.com/").unwrap();
        assert!(store.jar().cookies(&root).is_none());

        store.clear().await.unwrap();
        assert!(!store.has_session());
        let api = Url::parse("https://peeljobs.com/api/v1/jobs/").unwrap();
        assert!(store.jar().cookies(&api).is_none());
    }
}
