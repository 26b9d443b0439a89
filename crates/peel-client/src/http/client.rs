//! HTTP transport for the REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use peel_core::{
    AccessToken, ApiBaseUrl, ApiError, Error, ErrorPayload, InvalidInputError, Result,
    TransportError,
};

use crate::config::ClientConfig;

use super::request::{ApiRequest, RequestBody};

/// Message used when an error response has no JSON body.
const UNPARSEABLE_ERROR: &str = "Request failed";

/// Thin wrapper over `reqwest` that knows the base URL and how to attach
/// credentials. Retry and refresh policy live in [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
    base: ApiBaseUrl,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a client; `jar` switches on cookie transport.
    pub(crate) fn new(config: &ClientConfig, jar: Option<Arc<Jar>>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());

        if let Some(jar) = jar {
            builder = builder.cookie_provider(jar);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|err| transport_error(err, config.request_timeout))?;

        Ok(Self {
            client,
            base: config.base_url.clone(),
            timeout: config.request_timeout,
        })
    }

    /// Returns the base URL this client is configured for.
    pub(crate) fn base(&self) -> &ApiBaseUrl {
        &self.base
    }

    /// Send one attempt of `request`, attaching `token` as a bearer header.
    #[instrument(skip(self, request, token), fields(method = %request.method, endpoint = %request.endpoint))]
    pub(crate) async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response> {
        let url = self.base.endpoint_url(&request.endpoint);
        debug!(authed = token.is_some(), "API request");
        trace!(query = ?request.query, "query parameters");

        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer(token)?);
        }

        builder = match &request.body {
            RequestBody::Empty => {
                builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(body) => builder.json(body),
            // The transport picks the multipart boundary and content type
            RequestBody::Form(form) => builder.multipart(form.to_multipart()?),
        };

        let response = builder
            .send()
            .await
            .map_err(|err| transport_error(err, self.timeout))?;
        trace!(status = %response.status(), "API response");

        Ok(response)
    }

    /// Decode a success response; an empty body decodes as JSON `null`.
    pub(crate) async fn decode_success<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R> {
        // The request timeout also covers reading the body
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(err, self.timeout))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Return the body of a success response or the normalized error.
    pub(crate) async fn into_result<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R> {
        let status = response.status();
        if status.is_success() {
            self.decode_success(response).await
        } else {
            let error = api_error(response).await;
            debug!(status = %status, message = %error, "API error");
            Err(Error::Api(error))
        }
    }
}

/// Create an authorization header value for `token`.
fn bearer(token: &AccessToken) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| InvalidInputError::Token)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Turn a non-success response into an [`ApiError`].
pub(crate) async fn api_error(response: reqwest::Response) -> ApiError {
    let status = response.status();

    let payload = match response.bytes().await {
        Ok(body) => ErrorPayload::from_slice(&body),
        Err(_) => None,
    };

    let payload = payload.unwrap_or_else(|| ErrorPayload::Error {
        error: UNPARSEABLE_ERROR.to_string(),
        detail: status.canonical_reason().map(str::to_string),
    });

    ApiError::new(status.as_u16(), payload)
}

pub(crate) fn is_unauthorized(response: &reqwest::Response) -> bool {
    response.status() == StatusCode::UNAUTHORIZED
}

/// Map a `reqwest` failure onto the transport error kinds.
///
/// `timeout` is the configured request timeout, reported back when it fires.
fn transport_error(err: reqwest::Error, timeout: Option<Duration>) -> Error {
    let err = if err.is_timeout() {
        let duration_ms = timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        TransportError::Timeout { duration_ms }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}
