use reqwest::StatusCode;
use thiserror::Error;

/// Message shown for any transport-level failure (DNS, refused connection, reset).
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";

/// Message shown when a 2xx body does not match the endpoint's schema.
pub const DECODE_MESSAGE: &str = "Unexpected response from server.";

/// Message shown when a request body cannot be serialized.
pub const ENCODE_MESSAGE: &str = "Could not prepare the request.";

/// The single error value every API call fails with.
///
/// `Display` is always a display-ready message; the underlying cause of
/// network and decode failures is logged, never surfaced.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{}", NETWORK_MESSAGE)]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("{}", DECODE_MESSAGE)]
    Decode(String),

    /// A request body could not be serialized; nothing was sent.
    #[error("{}", ENCODE_MESSAGE)]
    Encode(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_message_only() {
        let err = GatewayError::Http {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid credentials".into(),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_decode_error_hides_cause() {
        let err = GatewayError::Decode("missing field `access`".into());
        assert_eq!(err.message(), DECODE_MESSAGE);
        assert_eq!(err.status(), None);
    }
}
