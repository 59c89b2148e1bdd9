//! Per-item in-flight tracking for verify toggles.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::errors::GatewayError;
use crate::gateway::{ApiClient, CancelToken};
use crate::api::cooperatives::verify_request;
use crate::models::cooperative::VerifyResult;

/// Result of a toggle request as seen by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; carries the new verified flag.
    Applied(bool),
    /// A toggle for the same member was already in flight; nothing was sent.
    Suppressed,
    /// The call failed; the member's state is unchanged.
    Failed,
    /// The view was closed before the call settled.
    Cancelled,
}

/// A member as addressed by the verify endpoint. The same account listed
/// under two cooperatives is two independent keys.
pub type ToggleKey = (i64, i64);

/// Set of (cooperative, member) pairs with a mutation outstanding. Clones
/// share the set.
#[derive(Clone, Default)]
pub struct ToggleTracker {
    in_flight: Arc<DashMap<ToggleKey, ()>>,
}

impl ToggleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` in flight. Returns `None` if it already is. The mark is
    /// cleared when the guard drops, whatever the call's outcome.
    pub fn try_begin(&self, key: ToggleKey) -> Option<ToggleGuard> {
        match self.in_flight.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(ToggleGuard {
                    in_flight: Arc::clone(&self.in_flight),
                    key,
                })
            }
        }
    }

    pub fn is_pending(&self, key: ToggleKey) -> bool {
        self.in_flight.contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }
}

#[must_use = "the in-flight mark is cleared as soon as the guard is dropped"]
pub struct ToggleGuard {
    in_flight: Arc<DashMap<ToggleKey, ()>>,
    key: ToggleKey,
}

impl Drop for ToggleGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

/// Issue one verify toggle under the tracker's rules and hand a successful
/// result to `apply`. Failures are logged, never surfaced.
pub(crate) async fn run_toggle(
    client: &ApiClient,
    tracker: &ToggleTracker,
    cancel: &CancelToken,
    cooperative_id: i64,
    member_id: i64,
    apply: impl FnOnce(VerifyResult),
) -> ToggleOutcome {
    let Some(_guard) = tracker.try_begin((cooperative_id, member_id)) else {
        tracing::debug!(cooperative_id, member_id, "verify already in flight, ignoring");
        return ToggleOutcome::Suppressed;
    };

    let req = verify_request(cooperative_id, member_id);
    match client.fetch_with_cancel::<VerifyResult>(&req, cancel).await {
        Ok(result) if cancel.is_cancelled() => {
            tracing::debug!(member_id, verified = result.is_verified, "view closed, dropping verify result");
            ToggleOutcome::Cancelled
        }
        Ok(result) => {
            tracing::info!(cooperative_id, member_id, verified = result.is_verified, "member verification toggled");
            apply(result);
            ToggleOutcome::Applied(result.is_verified)
        }
        Err(GatewayError::Cancelled) => ToggleOutcome::Cancelled,
        Err(e) => {
            tracing::warn!(cooperative_id, member_id, "verify toggle failed: {}", e);
            ToggleOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_until_guard_drops() {
        let tracker = ToggleTracker::new();
        let guard = tracker.try_begin((1, 7)).expect("first begin");
        assert!(tracker.is_pending((1, 7)));
        assert!(tracker.try_begin((1, 7)).is_none());

        // Other members are independent.
        let other = tracker.try_begin((1, 8)).expect("different member");
        assert_eq!(tracker.pending_count(), 2);

        drop(guard);
        assert!(!tracker.is_pending((1, 7)));
        assert!(tracker.try_begin((1, 7)).is_some());
        drop(other);
    }

    #[test]
    fn test_clones_share_in_flight_set() {
        let a = ToggleTracker::new();
        let b = a.clone();
        let _g = a.try_begin((1, 1)).unwrap();
        assert!(b.try_begin((1, 1)).is_none());
    }

    #[test]
    fn test_same_member_in_two_cooperatives_is_independent() {
        let tracker = ToggleTracker::new();
        let _first = tracker.try_begin((1, 7)).unwrap();
        assert!(tracker.try_begin((2, 7)).is_some());
        assert!(!tracker.is_pending((3, 7)));
    }
}
