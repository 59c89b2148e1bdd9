use std::sync::Arc;

use dashmap::DashMap;

use super::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// In-process key/value credential store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<&'static str, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token pair.
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        store.set(access, refresh);
        store
    }

    /// Number of keys currently held (for tests / debugging).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty strings read as absent, same as the file store.
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .map(|v| v.value().clone())
            .filter(|v| !v.is_empty())
    }
}

impl CredentialStore for MemoryStore {
    fn set(&self, access: &str, refresh: &str) {
        self.entries.insert(ACCESS_TOKEN_KEY, access.to_string());
        self.entries.insert(REFRESH_TOKEN_KEY, refresh.to_string());
    }

    fn clear(&self) {
        self.entries.remove(ACCESS_TOKEN_KEY);
        self.entries.remove(REFRESH_TOKEN_KEY);
    }

    fn access(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }
}
