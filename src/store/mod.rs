//! Credential storage for the access/refresh token pair.
//!
//! Tokens are opaque strings kept under two fixed keys. Storage is assumed
//! always available: a backend that cannot be read reports no credential
//! (the client degrades to logged-out), and a failed write is logged and
//! dropped.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage key of the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "imena_access_token";
/// Storage key of the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "imena_refresh_token";

/// Abstraction over credential storage backends.
/// Implementations: MemoryStore (in-process), FileStore (JSON file on disk).
pub trait CredentialStore: Send + Sync {
    /// Persist both tokens.
    fn set(&self, access: &str, refresh: &str);

    /// Remove both tokens. Clearing an empty store is a no-op.
    fn clear(&self);

    fn access(&self) -> Option<String>;

    fn refresh(&self) -> Option<String>;

    fn has_credentials(&self) -> bool {
        self.access().is_some()
    }
}
