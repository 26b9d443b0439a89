//! peel-client - Authenticated HTTP client for the PeelJobs REST API.
//!
//! [`ApiClient`] attaches the session credential to every call, refreshes
//! it once when the backend answers 401, and turns error responses into
//! human-readable messages. Credentials live behind a
//! [`CredentialStore`](peel_core::CredentialStore): bearer tokens in memory
//! or on disk, or HTTP-only cookies managed by the server.

mod auth;
mod client;
mod config;
mod http;
mod redirect;
pub mod refresh;
mod store;

pub use auth::{AuthResponse, GoogleAuthUrlResponse, User};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{
    ClientConfig, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH, DEFAULT_REFRESH_TIMEOUT,
    ENV_API_URL, ENV_LOGIN_PATH, ENV_REFRESH_TIMEOUT_SECS,
};
pub use http::{ApiRequest, FormData, RequestBody};
pub use redirect::{LoginRedirect, SessionListener};
pub use store::{CookieNames, CookieStore, FileStore, MemoryStore};

pub use reqwest::Method;
