//! The authenticated API client.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use peel_core::{
    AccessToken, AuthError, CredentialStore, CredentialTransport, Error, InvalidInputError,
    Result, TokenPair,
};

use crate::config::ClientConfig;
use crate::http::client as transport;
use crate::http::{ApiRequest, FormData, HttpClient};
use crate::redirect::{LoginRedirect, SessionListener};
use crate::refresh::{Acquired, RefreshCoordinator};
use crate::store::{CookieStore, MemoryStore};

/// Response from the refresh endpoint in bearer mode.
#[derive(Debug, serde::Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// An authenticated client for the PeelJobs REST API.
///
/// Every call attaches the session credential, and a call rejected with 401
/// is retried once after a refresh. Concurrent rejections share a single
/// refresh call; see [`crate::refresh`].
///
/// Clients are cheap to clone (they use internal `Arc`) and safe to share
/// across tasks.
///
/// # Example
///
/// ```no_run
/// use peel_client::{ApiClient, ClientConfig};
/// use peel_core::{ApiBaseUrl, TokenPair};
///
/// # async fn example() -> Result<(), peel_core::Error> {
/// let config = ClientConfig::new(ApiBaseUrl::new("https://peeljobs.com/api/v1")?);
/// let client = ApiClient::builder(config).build()?;
/// client.store().save(TokenPair::new("access", "refresh")).await?;
///
/// let jobs: serde_json::Value = client
///     .get("/jobs/", &serde_json::json!({ "page": 2 }))
///     .await?;
/// println!("{}", jobs);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    store: Arc<dyn CredentialStore>,
    refresh: RefreshCoordinator,
    config: ClientConfig,
    listener: Option<Arc<dyn SessionListener>>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    cookies: Option<CookieStore>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl ApiClientBuilder {
    /// Use a bearer-token store. Defaults to a [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self.cookies = None;
        self
    }

    /// Use HTTP-only cookies; the store's jar is installed into the client.
    pub fn cookie_store(mut self, store: CookieStore) -> Self {
        self.store = None;
        self.cookies = Some(store);
        self
    }

    /// Be told when a session expires for good.
    pub fn listener(mut self, listener: impl SessionListener + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let (store, jar) = match (self.store, self.cookies) {
            (_, Some(cookies)) => {
                let jar = cookies.jar();
                let store: Arc<dyn CredentialStore> = Arc::new(cookies);
                (store, Some(jar))
            }
            (Some(store), None) => {
                // A cookie store without its jar would never send anything
                if store.transport() == CredentialTransport::Cookie {
                    return Err(InvalidInputError::Other {
                        message: "cookie stores must be installed with cookie_store()"
                            .to_string(),
                    }
                    .into());
                }
                (store, None)
            }
            (None, None) => {
                let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
                (store, None)
            }
        };

        let http = HttpClient::new(&self.config, jar)?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                store,
                refresh: RefreshCoordinator::new(),
                config: self.config,
                listener: self.listener,
            }),
        })
    }
}

impl ApiClient {
    /// Start building a client.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            store: None,
            cookies: None,
            listener: None,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the credential store.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Returns true while a token refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    // ========================================================================
    // Request execution
    // ========================================================================

    /// Perform one logical call and decode its JSON body.
    ///
    /// At most two network attempts are made: the original request and, if
    /// it was rejected with 401, one retry after a refresh. A 401 for a token
    /// that another call has already replaced is retried with the stored
    /// token without refreshing again.
    #[instrument(skip(self, request), fields(method = %request.method(), endpoint = %request.endpoint()))]
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let sent = self.credential_for(&request).await?;
        let response = self.inner.http.dispatch(&request, sent.as_ref()).await?;

        if request.is_public() || !transport::is_unauthorized(&response) {
            return self.inner.http.into_result(response).await;
        }

        let token = match self.replaced_token(sent.as_ref()).await? {
            Some(current) => {
                debug!("access token already refreshed, retrying");
                Some(current)
            }
            None => {
                debug!("access token rejected, refreshing session");
                self.refresh_session(request.return_to.as_deref()).await?
            }
        };

        let response = self.inner.http.dispatch(&request, token.as_ref()).await?;
        self.inner.http.into_result(response).await
    }

    /// GET `endpoint` with query parameters.
    pub async fn get<T, Q>(&self, endpoint: &str, params: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(ApiRequest::get(endpoint).query(params)?).await
    }

    /// GET a public endpoint without credentials.
    pub async fn get_public<T, Q>(&self, endpoint: &str, params: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(ApiRequest::get(endpoint).query(params)?.skip_auth())
            .await
    }

    /// POST a JSON body.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::post(endpoint).json_from(body)?).await
    }

    /// POST a JSON body to a public endpoint without credentials.
    pub async fn post_public<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::post(endpoint).json_from(body)?.skip_auth())
            .await
    }

    /// PUT a JSON body.
    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::put(endpoint).json_from(body)?).await
    }

    /// PATCH a JSON body.
    pub async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::patch(endpoint).json_from(body)?).await
    }

    /// DELETE `endpoint`.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send(ApiRequest::delete(endpoint)).await
    }

    /// POST a multipart form (file uploads).
    pub async fn post_form<T: DeserializeOwned>(&self, endpoint: &str, form: FormData) -> Result<T> {
        self.send(ApiRequest::post(endpoint).form(form)).await
    }

    /// POST a multipart form to a public endpoint without credentials.
    pub async fn post_form_public<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: FormData,
    ) -> Result<T> {
        self.send(ApiRequest::post(endpoint).form(form).skip_auth())
            .await
    }

    // ========================================================================
    // Session refresh
    // ========================================================================

    /// Refresh the session now, sharing any refresh already in flight.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        self.refresh_session(None).await.map(|_| ())
    }

    async fn credential_for(&self, request: &ApiRequest) -> Result<Option<AccessToken>> {
        if request.is_public() {
            return Ok(None);
        }
        match self.inner.store.transport() {
            CredentialTransport::Bearer => self.inner.store.access_token().await,
            CredentialTransport::Cookie => Ok(None),
        }
    }

    /// Returns the stored access token if it differs from the one `sent`.
    ///
    /// Cookie sessions never expose their token, so they always refresh.
    async fn replaced_token(&self, sent: Option<&AccessToken>) -> Result<Option<AccessToken>> {
        let Some(sent) = sent else {
            return Ok(None);
        };
        let current = self.inner.store.access_token().await?;
        Ok(current.filter(|current| current != sent))
    }

    /// Lead a refresh or wait for the one in flight, returning the credential
    /// to retry with.
    async fn refresh_session(&self, return_to: Option<&str>) -> Result<Option<AccessToken>> {
        let guard = match self.inner.refresh.acquire_or_wait() {
            Acquired::Leader(guard) => guard,
            Acquired::Waiter(waiter) => return waiter.wait().await.map_err(Error::from),
        };

        let timeout = self.inner.config.refresh_timeout;
        let outcome = match tokio::time::timeout(timeout, self.perform_refresh()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::RefreshTimedOut {
                duration_ms: timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(token) => {
                info!("session refreshed");
                guard.resolve(token.clone());
                Ok(token)
            }
            Err(error) => {
                warn!(%error, "session refresh failed");
                if error.is_terminal() {
                    self.expire_session(return_to).await;
                }
                guard.reject(error.clone());
                Err(error.into())
            }
        }
    }

    /// Call the refresh endpoint and store whatever it hands back.
    async fn perform_refresh(&self) -> std::result::Result<Option<AccessToken>, AuthError> {
        let store = &self.inner.store;
        let endpoint = self.inner.config.refresh_path.as_str();

        let (request, current) = match store.transport() {
            CredentialTransport::Bearer => {
                let current = store
                    .refresh_token()
                    .await
                    .map_err(refresh_failed)?
                    .ok_or(AuthError::MissingRefreshToken)?;
                let request = ApiRequest::post(endpoint)
                    .json(json!({ "refresh": current.as_str() }))
                    .skip_auth();
                (request, Some(current))
            }
            // The jar carries the refresh cookie
            CredentialTransport::Cookie => (ApiRequest::post(endpoint).skip_auth(), None),
        };

        let response = self
            .inner
            .http
            .dispatch(&request, None)
            .await
            .map_err(refresh_failed)?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "refresh token rejected");
            return Err(AuthError::SessionExpired);
        }

        let Some(current) = current else {
            return Ok(None);
        };

        let body: RefreshResponse = self
            .inner
            .http
            .decode_success(response)
            .await
            .map_err(refresh_failed)?;

        let tokens = match body.refresh {
            Some(rotated) => TokenPair::new(body.access, rotated),
            None => TokenPair {
                access: AccessToken::new(body.access),
                refresh: current,
            },
        };
        let access = tokens.access.clone();
        store.save(tokens).await.map_err(refresh_failed)?;

        Ok(Some(access))
    }

    /// Forget the session and tell the listener where to send the user.
    async fn expire_session(&self, return_to: Option<&str>) {
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "failed to clear stored credentials");
        }

        let redirect =
            LoginRedirect::new(self.inner.config.login_path.clone()).with_return_to(return_to);
        info!(location = %redirect, "session expired, login required");

        if let Some(listener) = &self.inner.listener {
            listener.session_expired(&redirect);
        }
    }

    pub(crate) async fn send_ignoring_body(&self, request: ApiRequest) -> Result<()> {
        self.send::<Value>(request).await.map(|_| ())
    }
}

fn refresh_failed(err: Error) -> AuthError {
    AuthError::RefreshFailed {
        message: err.to_string(),
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", self.inner.http.base())
            .field("transport", &self.inner.store.transport())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peel_core::ApiBaseUrl;

    fn config() -> ClientConfig {
        ClientConfig::new(ApiBaseUrl::new("https://peeljobs.com/api/v1").unwrap())
    }

    #[test]
    fn defaults_to_memory_store() {
        let client = ApiClient::builder(config()).build().unwrap();
        assert_eq!(client.store().transport(), CredentialTransport::Bearer);
        assert!(!client.is_refreshing());
    }

    #[test]
    fn cookie_store_switches_transport() {
        let config = config();
        let cookies = CookieStore::new(&config.base_url);
        let client = ApiClient::builder(config).cookie_store(cookies).build().unwrap();
        assert_eq!(client.store().transport(), CredentialTransport::Cookie);
    }

    #[test]
    fn cookie_store_needs_its_jar() {
        let config = config();
        let cookies = Arc::new(CookieStore::new(&config.base_url));
        let result = ApiClient::builder(config).store(cookies).build();
        assert!(result.is_err());
    }

    #[test]
    fn debug_hides_tokens() {
        let client = ApiClient::builder(config()).build().unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("peeljobs.com"));
    }
}
