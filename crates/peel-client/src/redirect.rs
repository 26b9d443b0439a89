//! Session-expiry notification.

use std::fmt;

use url::form_urlencoded;

/// Where to send the user once their session cannot be recovered.
///
/// # Example
///
/// ```
/// use peel_client::LoginRedirect;
///
/// let redirect = LoginRedirect::new("/login").with_return_to(Some("/dashboard/jobs"));
/// assert_eq!(redirect.location(), "/login?redirect=%2Fdashboard%2Fjobs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    login_path: String,
    return_to: Option<String>,
}

impl LoginRedirect {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            return_to: None,
        }
    }

    /// Remember the page to come back to after logging in.
    pub fn with_return_to(mut self, return_to: Option<impl Into<String>>) -> Self {
        self.return_to = return_to.map(Into::into);
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// The location to navigate to.
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(path) => {
                let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
                format!("{}?redirect={}", self.login_path, encoded)
            }
            None => self.login_path.clone(),
        }
    }
}

impl fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Notified when a refresh fails for good and credentials have been cleared.
pub trait SessionListener: Send + Sync {
    fn session_expired(&self, redirect: &LoginRedirect);
}

impl<F> SessionListener for F
where
    F: Fn(&LoginRedirect) + Send + Sync,
{
    fn session_expired(&self, redirect: &LoginRedirect) {
        self(redirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_login_path() {
        let redirect = LoginRedirect::new("/login");
        assert_eq!(redirect.location(), "/login");
        assert_eq!(redirect.to_string(), "/login");
    }

    #[test]
    fn return_path_is_encoded() {
        let redirect =
            LoginRedirect::new("/login").with_return_to(Some("/jobs/?q=rust developer"));
        assert_eq!(
            redirect.location(),
            "/login?redirect=%2Fjobs%2F%3Fq%3Drust+developer"
        );
        assert_eq!(redirect.return_to(), Some("/jobs/?q=rust developer"));
    }

    #[test]
    fn closures_are_listeners() {
        use std::sync::Mutex;

        let seen = Mutex::new(Vec::new());
        let listener = |r: &LoginRedirect| seen.lock().unwrap().push(r.location());
        listener.session_expired(&LoginRedirect::new("/login"));
        assert_eq!(*seen.lock().unwrap(), vec!["/login".to_string()]);
    }
}
