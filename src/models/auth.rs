use serde::{Deserialize, Serialize};

/// Body of `POST /api/token/`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    /// Email or phone number; the server's username field.
    pub username: &'a str,
    pub password: &'a str,
}

/// Access/refresh pair issued on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /api/token/refresh/`.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh response. `refresh` is only present when the server rotates
/// refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}
