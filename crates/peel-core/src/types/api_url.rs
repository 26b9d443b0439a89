//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the PeelJobs REST API.
///
/// Every request the client makes is `<base><endpoint>`, where endpoints are
/// absolute paths such as `/auth/me/`. The base usually carries the API
/// prefix, e.g. `https://peeljobs.com/api/v1`.
///
/// Plain HTTP is only accepted for loopback hosts.
///
/// # Example
///
/// ```
/// use peel_core::ApiBaseUrl;
///
/// let base = ApiBaseUrl::new("https://peeljobs.com/api/v1/").unwrap();
/// assert_eq!(base.endpoint_url("/auth/me/"),
///            "https://peeljobs.com/api/v1/auth/me/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiBaseUrl(Url);

impl ApiBaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::BaseUrl {
                value: s.to_string(),
                reason: "must not contain a query or fragment".to_string(),
            }
            .into());
        }

        // Normalize: drop the trailing slash so endpoints can be appended
        let mut normalized = url;
        let path = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&path);

        Ok(Self(normalized))
    }

    /// Returns the full URL for an endpoint path.
    ///
    /// A missing leading slash on `endpoint` is tolerated.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the origin (`scheme://host[:port]`) used to scope cookies.
    pub fn origin(&self) -> Url {
        let mut origin = self.0.clone();
        origin.set_path("/");
        origin
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_loopback = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_loopback) {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiBaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiBaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiBaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiBaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiBaseUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let base = ApiBaseUrl::new("https://peeljobs.com/api/v1").unwrap();
        assert_eq!(base.host(), Some("peeljobs.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let base = ApiBaseUrl::new("http://localhost:8000/api/v1").unwrap();
        assert_eq!(base.host(), Some("localhost"));
    }

    #[test]
    fn endpoint_url_construction() {
        let base = ApiBaseUrl::new("https://peeljobs.com/api/v1").unwrap();
        assert_eq!(
            base.endpoint_url("/auth/token/refresh/"),
            "https://peeljobs.com/api/v1/auth/token/refresh/"
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let base = ApiBaseUrl::new("https://peeljobs.com/api/v1/").unwrap();
        assert_eq!(
            base.endpoint_url("/jobs/"),
            "https://peeljobs.com/api/v1/jobs/"
        );
        assert_eq!(base.endpoint_url("jobs/"), "https://peeljobs.com/api/v1/jobs/");
    }

    #[test]
    fn root_base_url() {
        let base = ApiBaseUrl::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(base.endpoint_url("/auth/me/"), "http://127.0.0.1:9000/auth/me/");
        assert_eq!(base.origin().as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiBaseUrl::new("http://peeljobs.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiBaseUrl::new("/api/v1").is_err());
    }

    #[test]
    fn rejects_query_string() {
        assert!(ApiBaseUrl::new("https://peeljobs.com/api/v1?x=1").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let base = ApiBaseUrl::new("https://peeljobs.com/api/v1/").unwrap();
        let json = serde_json::to_string(&base).unwrap();
        assert_eq!(json, "\"https://peeljobs.com/api/v1\"");

        let parsed: ApiBaseUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, base);
    }

    #[test]
    fn deserialize_validates() {
        let result = serde_json::from_str::<ApiBaseUrl>("\"http://peeljobs.com/api/v1\"");
        assert!(result.is_err());
    }
}
