//! Session context: who is logged in, and the credential lifecycle.
//!
//! One `Session` per running application; clones share state. Transitions:
//!
//! ```text
//! Unknown ──restore()──▶ Authenticated(identity) | Anonymous
//! *       ──login()────▶ Authenticated(identity)   (Anonymous on failure)
//! *       ──logout()───▶ Anonymous
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::GatewayError;
use crate::gateway::ApiClient;
use crate::models::user::Identity;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup restore has not finished.
    Unknown,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Session {
    client: Arc<ApiClient>,
    state: Arc<watch::Sender<SessionState>>,
}

impl Session {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unknown);
        Self {
            client,
            state: Arc::new(tx),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Unknown)
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve the startup state from stored credentials.
    ///
    /// No access token: Anonymous without a network call. Otherwise the
    /// identity is fetched; any failure clears the credentials.
    pub async fn restore(&self) -> SessionState {
        if !self.client.store().has_credentials() {
            debug!("no stored credentials");
            self.transition(SessionState::Anonymous);
            return SessionState::Anonymous;
        }

        match self.client.current_user().await {
            Ok(identity) => {
                info!(user_id = identity.id, role = %identity.role, "session restored");
                let state = SessionState::Authenticated(identity);
                self.transition(state.clone());
                state
            }
            Err(e) => {
                warn!("stored session is no longer valid: {}", e);
                self.client.store().clear();
                self.transition(SessionState::Anonymous);
                SessionState::Anonymous
            }
        }
    }

    /// Exchange credentials, persist the pair, fetch the identity.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Identity, GatewayError> {
        let tokens = match self.client.obtain_tokens(identifier, secret).await {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!("credential exchange failed: {}", e);
                self.state.send_if_modified(|state| {
                    if matches!(state, SessionState::Unknown) {
                        *state = SessionState::Anonymous;
                        true
                    } else {
                        false
                    }
                });
                return Err(e);
            }
        };

        self.client.store().set(&tokens.access, &tokens.refresh);

        match self.client.current_user().await {
            Ok(identity) => {
                info!(user_id = identity.id, role = %identity.role, "logged in");
                self.transition(SessionState::Authenticated(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                // A pair without an identity is not a usable session.
                warn!("identity fetch after login failed: {}", e);
                self.client.store().clear();
                self.transition(SessionState::Anonymous);
                Err(e)
            }
        }
    }

    /// Drop credentials locally. Does not contact the server.
    pub fn logout(&self) {
        self.client.store().clear();
        if self.transition(SessionState::Anonymous) {
            info!("logged out");
        }
    }

    /// Returns whether the state changed.
    fn transition(&self, next: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CredentialStore, MemoryStore};

    fn session(store: MemoryStore) -> Session {
        // Unroutable port; tests here never reach the network.
        let client = ApiClient::new("http://127.0.0.1:9", Arc::new(store), None).unwrap();
        Session::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_restore_without_token_skips_network() {
        let s = session(MemoryStore::new());
        assert!(s.is_loading());
        assert_eq!(s.restore().await, SessionState::Anonymous);
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = MemoryStore::with_tokens("a", "r");
        let s = session(store.clone());
        let mut rx = s.subscribe();

        s.logout();
        assert_eq!(s.state(), SessionState::Anonymous);
        assert!(store.is_empty());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        s.logout();
        assert_eq!(s.state(), SessionState::Anonymous);
        assert!(!store.has_credentials());
        assert!(!rx.has_changed().unwrap());
    }
}
