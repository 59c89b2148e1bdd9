use std::sync::{Arc, RwLock};

use tracing::warn;

use super::toggle::{run_toggle, ToggleOutcome, ToggleTracker};
use crate::api::cooperatives::detail_request;
use crate::errors::GatewayError;
use crate::gateway::{ApiClient, CancelToken};
use crate::models::cooperative::CooperativeDetail;

/// One cooperative's member list with per-member verify toggles.
pub struct CooperativeView {
    client: Arc<ApiClient>,
    cooperative_id: i64,
    detail: RwLock<Option<CooperativeDetail>>,
    toggles: ToggleTracker,
    cancel: CancelToken,
}

impl CooperativeView {
    pub fn new(client: Arc<ApiClient>, cooperative_id: i64) -> Self {
        Self {
            client,
            cooperative_id,
            detail: RwLock::new(None),
            toggles: ToggleTracker::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn cooperative_id(&self) -> i64 {
        self.cooperative_id
    }

    /// Fetch the cooperative. Unlike the aggregated view the error is
    /// returned so it can be shown.
    pub async fn load(&self) -> Result<CooperativeDetail, GatewayError> {
        let req = detail_request(self.cooperative_id);
        let detail = self
            .client
            .fetch_with_cancel::<CooperativeDetail>(&req, &self.cancel)
            .await
            .inspect_err(|e| warn!(cooperative_id = self.cooperative_id, "failed to load cooperative: {}", e))?;
        if let Ok(mut slot) = self.detail.write() {
            *slot = Some(detail.clone());
        }
        Ok(detail)
    }

    pub fn detail(&self) -> Option<CooperativeDetail> {
        self.detail.read().ok().and_then(|d| d.clone())
    }

    pub fn is_pending(&self, member_id: i64) -> bool {
        self.toggles.is_pending((self.cooperative_id, member_id))
    }

    pub async fn toggle_verified(&self, member_id: i64) -> ToggleOutcome {
        run_toggle(
            &self.client,
            &self.toggles,
            &self.cancel,
            self.cooperative_id,
            member_id,
            |result| {
                if let Ok(mut slot) = self.detail.write() {
                    if let Some(detail) = slot.as_mut() {
                        for m in detail.members.iter_mut().filter(|m| m.id == result.id) {
                            m.is_verified = result.is_verified;
                        }
                    }
                }
            },
        )
        .await
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for CooperativeView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
