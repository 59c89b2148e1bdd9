//! Members of every cooperative an administrator manages, as one list.

use std::sync::{Arc, RwLock};

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::toggle::{run_toggle, ToggleOutcome, ToggleTracker};
use crate::api::cooperatives::detail_request;
use crate::errors::GatewayError;
use crate::gateway::{ApiClient, CancelToken};
use crate::models::cooperative::{AggregatedMember, Cooperative, CooperativeDetail};

/// Fetch every group's detail concurrently and flatten the members, in
/// group order then member order. Fails as a unit if any fetch fails.
pub async fn try_aggregate_members(
    client: &ApiClient,
    groups: &[Cooperative],
    cancel: &CancelToken,
) -> Result<Vec<AggregatedMember>, GatewayError> {
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let fetches = groups.iter().map(|group| async move {
        let req = detail_request(group.id);
        client
            .fetch_with_cancel::<CooperativeDetail>(&req, cancel)
            .await
    });
    let details = try_join_all(fetches).await?;

    Ok(flatten(details))
}

/// Like [`try_aggregate_members`], but a failed aggregation yields an empty
/// list. Partial results are discarded.
pub async fn aggregate_members(
    client: &ApiClient,
    groups: &[Cooperative],
    cancel: &CancelToken,
) -> Vec<AggregatedMember> {
    match try_aggregate_members(client, groups, cancel).await {
        Ok(members) => members,
        Err(e) => {
            warn!(groups = groups.len(), "member aggregation failed, showing none: {}", e);
            Vec::new()
        }
    }
}

pub fn flatten(details: Vec<CooperativeDetail>) -> Vec<AggregatedMember> {
    let mut out = Vec::with_capacity(details.iter().map(|d| d.members.len()).sum());
    for mut detail in details {
        let members = std::mem::take(&mut detail.members);
        out.extend(members.into_iter().map(|m| AggregatedMember::new(m, &detail)));
    }
    out
}

/// Administrator view over the aggregated member list.
pub struct MembersView {
    client: Arc<ApiClient>,
    records: RwLock<Vec<AggregatedMember>>,
    toggles: ToggleTracker,
    cancel: CancelToken,
}

impl MembersView {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            records: RwLock::new(Vec::new()),
            toggles: ToggleTracker::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the records with the aggregation over `groups`.
    /// Returns the number of records now held.
    pub async fn load(&self, groups: &[Cooperative]) -> usize {
        let members = aggregate_members(&self.client, groups, &self.cancel).await;
        if self.cancel.is_cancelled() {
            debug!("members view closed during load");
            return 0;
        }
        let count = members.len();
        if let Ok(mut records) = self.records.write() {
            *records = members;
        }
        info!(groups = groups.len(), members = count, "members loaded");
        count
    }

    /// Load the aggregation over every cooperative the user can see.
    /// A failing cooperative list counts as an empty one.
    pub async fn load_all(&self) -> usize {
        let groups = match self.client.list_cooperatives().await {
            Ok(groups) => groups,
            Err(e) => {
                warn!("cooperative list unavailable: {}", e);
                Vec::new()
            }
        };
        self.load(&groups).await
    }

    pub fn records(&self) -> Vec<AggregatedMember> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn is_pending(&self, cooperative_id: i64, member_id: i64) -> bool {
        self.toggles.is_pending((cooperative_id, member_id))
    }

    /// Flip one member's verified flag in one cooperative. Only that record
    /// changes on success; a failure leaves it as it was. A toggle for the
    /// same (cooperative, member) already in flight is suppressed.
    pub async fn toggle_verified(&self, cooperative_id: i64, member_id: i64) -> ToggleOutcome {
        run_toggle(
            &self.client,
            &self.toggles,
            &self.cancel,
            cooperative_id,
            member_id,
            |result| {
                if let Ok(mut records) = self.records.write() {
                    for rec in records.iter_mut().filter(|r| {
                        r.cooperative_id == cooperative_id && r.member.id == result.id
                    }) {
                        rec.member.is_verified = result.is_verified;
                    }
                }
            },
        )
        .await
    }

    /// Cancel outstanding calls; their results are dropped.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for MembersView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
