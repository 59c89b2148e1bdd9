use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Path prefix shared by the token-issuing and token-refreshing endpoints.
pub const TOKEN_PATH_PREFIX: &str = "/api/token/";

/// A single call to the remote API. Transient: built per call, never stored.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// When false the bearer header is never attached (token exchange,
    /// refresh, public endpoints).
    pub authenticated: bool,
}

impl GatewayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            method,
            body: None,
            headers: HeaderMap::new(),
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Token endpoints must never trigger the refresh-and-retry recovery.
    pub fn is_token_endpoint(&self) -> bool {
        self.path.starts_with(TOKEN_PATH_PREFIX)
    }
}

fn normalize_path(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}
