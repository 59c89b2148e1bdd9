//! Authenticated HTTP client for the Imena API.
//!
//! Every call goes through [`ApiClient::request`]:
//! - attach `Authorization: Bearer <access>` when a token is stored
//! - on 401 (outside the token endpoints) refresh the access token once and
//!   re-issue the call once
//! - turn non-2xx responses into a [`GatewayError`] with a display-ready
//!   message

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn, Instrument};
use url::Url;

use super::cancel::CancelToken;
use super::error_shape::error_message;
use super::request::GatewayRequest;
use crate::errors::GatewayError;
use crate::models::auth::{RefreshRequest, RefreshResponse};
use crate::store::CredentialStore;

pub const REFRESH_PATH: &str = "/api/token/refresh/";

/// Status and fully-read body of one HTTP exchange.
struct RawResponse {
    status: StatusCode,
    body: Bytes,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    /// Serializes refresh attempts so the store's read-then-write never
    /// interleaves across concurrent calls.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    /// Build a client for `base_url` (scheme + host, optional path prefix).
    /// `timeout` of `None` keeps the transport default.
    pub fn new(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid API base URL '{}': {}", base_url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("API base URL must be http or https, got '{}'", parsed.scheme());
        }

        let mut builder = Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("imena-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue `req`. A 204 resolves to `Ok(None)`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        req: &GatewayRequest,
    ) -> Result<Option<T>, GatewayError> {
        self.request_inner(req, None).await
    }

    /// Like [`request`](Self::request) but aborts with
    /// [`GatewayError::Cancelled`] once `cancel` fires.
    pub async fn request_with_cancel<T: DeserializeOwned>(
        &self,
        req: &GatewayRequest,
        cancel: &CancelToken,
    ) -> Result<Option<T>, GatewayError> {
        self.request_inner(req, Some(cancel)).await
    }

    /// Issue `req` and require a body.
    pub async fn fetch<T: DeserializeOwned>(&self, req: &GatewayRequest) -> Result<T, GatewayError> {
        self.request(req).await?.ok_or_else(empty_body)
    }

    pub async fn fetch_with_cancel<T: DeserializeOwned>(
        &self,
        req: &GatewayRequest,
        cancel: &CancelToken,
    ) -> Result<T, GatewayError> {
        self.request_with_cancel(req, cancel).await?.ok_or_else(empty_body)
    }

    async fn request_inner<T: DeserializeOwned>(
        &self,
        req: &GatewayRequest,
        cancel: Option<&CancelToken>,
    ) -> Result<Option<T>, GatewayError> {
        let span = tracing::debug_span!(
            "api_request",
            request_id = %uuid::Uuid::new_v4(),
            method = %req.method,
            path = %req.path,
        );
        async move {
            let raw = self.execute(req, cancel).await?;
            decode(raw)
        }
        .instrument(span)
        .await
    }

    /// Send, recover from one 401, and return the final exchange.
    async fn execute(
        &self,
        req: &GatewayRequest,
        cancel: Option<&CancelToken>,
    ) -> Result<RawResponse, GatewayError> {
        let access = if req.authenticated {
            self.store.access()
        } else {
            None
        };

        let mut response = self.dispatch(req, access.as_deref(), cancel).await?;

        if response.status == StatusCode::UNAUTHORIZED && req.authenticated && !req.is_token_endpoint() {
            if let Some(fresh) = self.refresh_access(cancel).await? {
                debug!("retrying with refreshed access token");
                response = self.dispatch(req, Some(&fresh), cancel).await?;
            }
        }

        Ok(response)
    }

    /// One HTTP exchange, body fully read. No recovery.
    async fn dispatch(
        &self,
        req: &GatewayRequest,
        access: Option<&str>,
        cancel: Option<&CancelToken>,
    ) -> Result<RawResponse, GatewayError> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(GatewayError::Cancelled);
        }

        let mut builder = self
            .http
            .request(req.method.clone(), self.url(&req.path))
            .headers(build_headers(req, access));
        if let Some(body) = &req.body {
            builder = builder.body(body.to_string());
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let body = resp.bytes().await?;
            Ok::<_, reqwest::Error>(RawResponse { status, body })
        };

        let result = match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(GatewayError::Cancelled),
                r = exchange => r,
            },
            None => exchange.await,
        };

        match result {
            Ok(raw) => {
                debug!(status = %raw.status, bytes = raw.body.len(), "response received");
                Ok(raw)
            }
            Err(e) => {
                warn!("request failed: {}", e);
                Err(GatewayError::Network(e))
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// `Ok(None)` means recovery is not possible (no refresh token, or the
    /// refresh call failed in any way); the caller keeps its original
    /// response. Only cancellation is reported as an error.
    async fn refresh_access(
        &self,
        cancel: Option<&CancelToken>,
    ) -> Result<Option<String>, GatewayError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(refresh) = self.store.refresh() else {
            debug!("access token rejected and no refresh token stored");
            return Ok(None);
        };

        let req = match GatewayRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh: &refresh }) {
            Ok(req) => req.anonymous(),
            Err(e) => {
                warn!("token refresh body could not be built: {}", e);
                return Ok(None);
            }
        };

        let raw = match self.dispatch(&req, None, cancel).await {
            Ok(raw) => raw,
            Err(GatewayError::Cancelled) => return Err(GatewayError::Cancelled),
            Err(e) => {
                warn!("token refresh failed: {}", e);
                return Ok(None);
            }
        };

        if !raw.status.is_success() {
            warn!(status = %raw.status, "token refresh rejected");
            return Ok(None);
        }

        match serde_json::from_slice::<RefreshResponse>(&raw.body) {
            Ok(tokens) => {
                let kept = tokens.refresh.as_deref().unwrap_or(refresh.as_str());
                self.store.set(&tokens.access, kept);
                info!(rotated = tokens.refresh.is_some(), "access token refreshed");
                Ok(Some(tokens.access))
            }
            Err(e) => {
                warn!("token refresh returned an unexpected body: {}", e);
                Ok(None)
            }
        }
    }
}

fn build_headers(req: &GatewayRequest, access: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in &req.headers {
        headers.insert(name.clone(), value.clone());
    }
    if let Some(token) = access {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("stored access token is not a valid header value; sending without it"),
        }
    }
    headers
}

fn decode<T: DeserializeOwned>(raw: RawResponse) -> Result<Option<T>, GatewayError> {
    if !raw.status.is_success() {
        let text = String::from_utf8_lossy(&raw.body);
        let message = error_message(raw.status, &text);
        warn!(status = %raw.status, message = %message, "request rejected");
        return Err(GatewayError::Http {
            status: raw.status,
            message,
        });
    }

    if raw.status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    serde_json::from_slice(&raw.body).map(Some).map_err(|e| {
        warn!(status = %raw.status, "response did not match expected shape: {}", e);
        GatewayError::Decode(e.to_string())
    })
}

fn empty_body() -> GatewayError {
    GatewayError::Decode("empty response body".to_string())
}
