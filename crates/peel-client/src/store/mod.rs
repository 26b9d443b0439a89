//! Credential store implementations.
//!
//! Pick one per client: [`MemoryStore`] or [`FileStore`] for bearer-token
//! deployments, [`CookieStore`] when the server manages HTTP-only cookies.

mod cookie;
mod file;
mod memory;

pub use cookie::{CookieNames, CookieStore};
pub use file::FileStore;
pub use memory::MemoryStore;
