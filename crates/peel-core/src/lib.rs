//! peel-core - Core types and traits for the PeelJobs API client.
//!
//! This crate holds everything the client and its callers share: the
//! validated [`ApiBaseUrl`], opaque JWT token types, the [`Error`] hierarchy,
//! the [`ErrorPayload`] model for backend rejections together with its
//! normalizer, and the [`CredentialStore`] seam.

pub mod error;
pub mod format;
pub mod payload;
pub mod tokens;
pub mod traits;
pub mod types;

pub use error::{ApiError, AuthError, Error, InvalidInputError, TransportError};
pub use format::{FALLBACK_MESSAGE, field_label, format_api_error};
pub use payload::{ErrorPayload, FieldErrors, NON_FIELD_ERRORS};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{CredentialStore, CredentialTransport};
pub use types::ApiBaseUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
