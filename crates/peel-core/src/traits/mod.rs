//! Core traits for credential handling.

mod credential_store;

pub use credential_store::{CredentialStore, CredentialTransport};
