//! Typed helpers for the authentication endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use peel_core::{CredentialTransport, Result, TokenPair};

use crate::client::ApiClient;
use crate::http::ApiRequest;

/// An authenticated PeelJobs user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_type: String,
    #[serde(default)]
    pub profile_completion_percentage: u8,
    #[serde(default)]
    pub is_gp_connected: bool,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Full name, falling back to the username.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// Response to a successful login.
///
/// In bearer mode the tokens come back in the body; in cookie mode the
/// server sets them as cookies and the token fields are absent.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(default)]
    pub requires_profile_completion: bool,
    #[serde(default)]
    pub redirect_to: Option<String>,
    #[serde(default)]
    pub is_new_user: bool,
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

impl AuthResponse {
    fn tokens(&self) -> Option<TokenPair> {
        match (&self.access, &self.refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access.clone(), refresh.clone())),
            _ => None,
        }
    }
}

/// Where to send the user to start Google sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleAuthUrlResponse {
    pub auth_url: String,
    #[serde(default)]
    pub user_type: Option<String>,
}

impl ApiClient {
    /// Get the Google OAuth URL to redirect the user to.
    #[instrument(skip(self))]
    pub async fn google_auth_url(&self, redirect_uri: &str) -> Result<GoogleAuthUrlResponse> {
        self.send(
            ApiRequest::get("/auth/google/url/")
                .query_pair("redirect_uri", redirect_uri)
                .skip_auth(),
        )
        .await
    }

    /// Exchange a Google authorization code for a session.
    #[instrument(skip(self, code))]
    pub async fn google_callback(&self, code: &str, redirect_uri: &str) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .send(
                ApiRequest::post("/auth/google/callback/")
                    .json(json!({ "code": code, "redirect_uri": redirect_uri }))
                    .skip_auth(),
            )
            .await?;

        if let Some(tokens) = response.tokens() {
            self.store().save(tokens).await?;
        }
        info!(user = %response.user.email, new_user = response.is_new_user, "logged in");

        Ok(response)
    }

    /// Fetch the logged-in user.
    pub async fn current_user(&self) -> Result<User> {
        self.send(ApiRequest::get("/auth/me/")).await
    }

    /// Blacklist the refresh token and forget the session.
    ///
    /// Local credentials are cleared even if the server call fails; that
    /// failure is still returned.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let body = match self.store().transport() {
            CredentialTransport::Bearer => match self.store().refresh_token().await? {
                Some(token) => json!({ "refresh": token.as_str() }),
                None => json!({}),
            },
            // The server reads the refresh cookie
            CredentialTransport::Cookie => json!({}),
        };

        let result = self
            .send_ignoring_body(ApiRequest::post("/auth/logout/").json(body))
            .await;
        if let Err(e) = &result {
            warn!(error = %e, "server logout failed");
        }

        self.store().clear().await?;
        info!("logged out");
        result
    }

    /// Unlink the Google account from the logged-in user.
    pub async fn disconnect_google(&self) -> Result<()> {
        self.send_ignoring_body(ApiRequest::post("/auth/google/disconnect/").json(json!({})))
            .await
    }
}
