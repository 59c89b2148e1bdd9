use crate::errors::GatewayError;
use crate::gateway::{ApiClient, GatewayRequest};
use crate::models::auth::{LoginRequest, TokenPair};
use crate::models::user::{Identity, RegisterRequest, RegisterResponse};

pub const TOKEN_PATH: &str = "/api/token/";
pub const ME_PATH: &str = "/api/users/me/";
pub const REGISTER_PATH: &str = "/api/users/register/";

/// POST /api/token/ - never carries a bearer header.
pub fn token_request(identifier: &str, password: &str) -> Result<GatewayRequest, GatewayError> {
    Ok(GatewayRequest::post(TOKEN_PATH)
        .json(&LoginRequest {
            username: identifier,
            password,
        })?
        .anonymous())
}

pub fn me_request() -> GatewayRequest {
    GatewayRequest::get(ME_PATH)
}

impl ApiClient {
    /// Exchange an email/phone and password for a token pair.
    /// Does not persist the pair.
    pub async fn obtain_tokens(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<TokenPair, GatewayError> {
        self.fetch(&token_request(identifier, password)?).await
    }

    /// GET /api/users/me/
    pub async fn current_user(&self) -> Result<Identity, GatewayError> {
        self.fetch(&me_request()).await
    }

    /// POST /api/users/register/ - public account creation.
    pub async fn register(&self, body: &RegisterRequest) -> Result<RegisterResponse, GatewayError> {
        let req = GatewayRequest::post(REGISTER_PATH).json(body)?.anonymous();
        Ok(self
            .request(&req)
            .await?
            .unwrap_or(RegisterResponse { detail: None }))
    }
}
