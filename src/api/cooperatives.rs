use serde_json::Value;

use crate::errors::GatewayError;
use crate::gateway::{ApiClient, GatewayRequest};
use crate::models::cooperative::{Cooperative, CooperativeDetail, NewCooperative, VerifyResult};

pub const COOPERATIVES_PATH: &str = "/api/cooperatives/";
pub const SIGNUP_CHOICES_PATH: &str = "/api/cooperatives/signup_choices/";

pub fn detail_request(cooperative_id: i64) -> GatewayRequest {
    GatewayRequest::get(format!("{}{}/", COOPERATIVES_PATH, cooperative_id))
}

pub fn verify_request(cooperative_id: i64, member_id: i64) -> GatewayRequest {
    GatewayRequest::post(format!(
        "{}{}/members/{}/verify/",
        COOPERATIVES_PATH, cooperative_id, member_id
    ))
}

/// Lists arrive as bare arrays; anything else (e.g. a paginated envelope)
/// is treated as an empty list.
fn list_or_empty(value: Option<Value>) -> Result<Vec<Cooperative>, GatewayError> {
    match value {
        Some(Value::Array(items)) => serde_json::from_value(Value::Array(items))
            .map_err(|e| GatewayError::Decode(e.to_string())),
        Some(other) => {
            tracing::debug!(kind = ?other, "cooperative list was not an array");
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

impl ApiClient {
    /// GET /api/cooperatives/ - cooperatives visible to the current user.
    pub async fn list_cooperatives(&self) -> Result<Vec<Cooperative>, GatewayError> {
        list_or_empty(self.request::<Value>(&GatewayRequest::get(COOPERATIVES_PATH)).await?)
    }

    /// GET /api/cooperatives/signup_choices/ - public list for the signup
    /// form. Any failure yields an empty list.
    pub async fn signup_choices(&self) -> Vec<Cooperative> {
        let req = GatewayRequest::get(SIGNUP_CHOICES_PATH).anonymous();
        match self.request::<Value>(&req).await.and_then(list_or_empty) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("signup choices unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// POST /api/cooperatives/ - the caller becomes an admin of it.
    pub async fn create_cooperative(&self, name: &str) -> Result<Cooperative, GatewayError> {
        let req = GatewayRequest::post(COOPERATIVES_PATH).json(&NewCooperative { name })?;
        self.fetch(&req).await
    }

    /// GET /api/cooperatives/{id}/
    pub async fn cooperative_detail(&self, cooperative_id: i64) -> Result<CooperativeDetail, GatewayError> {
        self.fetch(&detail_request(cooperative_id)).await
    }

    /// POST /api/cooperatives/{id}/members/{member_id}/verify/ - flips the
    /// member's verified flag and returns the new value.
    pub async fn verify_member(
        &self,
        cooperative_id: i64,
        member_id: i64,
    ) -> Result<VerifyResult, GatewayError> {
        self.fetch(&verify_request(cooperative_id, member_id)).await
    }
}
