//! Error message extraction for non-2xx responses.
//!
//! The server answers failures in several shapes:
//!
//! ```text
//! {"detail": "Invalid credentials"}             // auth / permission errors
//! {"cooperative": ["This field is required."]}  // serializer field errors
//! {"confirm_password": "Passwords do not match."}
//! <html>...</html>                              // proxy / debug pages
//! ```
//!
//! Each shape is handled by one strategy; strategies run in order and the
//! first one that resolves wins. If none does, the raw body is used.

use reqwest::StatusCode;
use serde_json::{Map, Value};

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again.";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed.";

/// Fields probed by name before falling back to the first field.
const KNOWN_FIELDS: &[&str] = &["cooperative", "date"];

/// A failed response as seen by the strategies.
pub struct ErrorBody<'a> {
    pub status: StatusCode,
    pub raw: &'a str,
    object: Option<Map<String, Value>>,
}

impl<'a> ErrorBody<'a> {
    pub fn new(status: StatusCode, raw: &'a str) -> Self {
        let object = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        };
        Self { status, raw, object }
    }
}

/// Outcome of a strategy that matched.
#[derive(Debug, PartialEq)]
pub enum Resolution {
    Message(String),
    /// Substitute the generic, status-dependent message.
    Generic,
}

pub type Strategy = fn(&ErrorBody<'_>) -> Option<Resolution>;

/// Extraction order. Markup is checked before parsing so an HTML page is
/// never surfaced even if it happens to contain JSON-looking text.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("markup", markup_body),
    ("non_object", non_object_body),
    ("detail", detail_field),
    ("known_field", known_field),
    ("first_field", first_field),
];

/// Resolve the display message for a failed response.
pub fn error_message(status: StatusCode, raw: &str) -> String {
    let body = ErrorBody::new(status, raw);

    let resolved = STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            strategy(&body).map(|r| {
                tracing::trace!(strategy = name, status = %status, "error message resolved");
                r
            })
        })
        .unwrap_or_else(|| Resolution::Message(raw.to_string()));

    let message = match resolved {
        Resolution::Message(m) => m,
        Resolution::Generic => generic_message(status).to_string(),
    };

    if message.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        message
    }
}

pub fn generic_message(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        SERVER_ERROR_MESSAGE
    } else {
        REQUEST_FAILED_MESSAGE
    }
}

fn markup_body(body: &ErrorBody<'_>) -> Option<Resolution> {
    body.raw
        .trim_start()
        .starts_with('<')
        .then_some(Resolution::Generic)
}

fn non_object_body(body: &ErrorBody<'_>) -> Option<Resolution> {
    body.object.is_none().then_some(Resolution::Generic)
}

fn detail_field(body: &ErrorBody<'_>) -> Option<Resolution> {
    let detail = body.object.as_ref()?.get("detail")?;
    if !is_truthy(detail) {
        return None;
    }
    let message = match detail {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some(Resolution::Message(message))
}

fn known_field(body: &ErrorBody<'_>) -> Option<Resolution> {
    let object = body.object.as_ref()?;
    let value = KNOWN_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|v| is_truthy(v))?;

    let message = match value {
        Value::Array(items) => items
            .first()
            .filter(|v| is_truthy(v))
            .map(scalar_text)
            .unwrap_or_else(|| body.raw.to_string()),
        Value::String(s) => s.clone(),
        _ => body.raw.to_string(),
    };
    Some(Resolution::Message(message))
}

fn first_field(body: &ErrorBody<'_>) -> Option<Resolution> {
    let (_, value) = body.object.as_ref()?.iter().next()?;
    match value {
        Value::Array(items) => items
            .first()
            .filter(|v| is_truthy(v))
            .map(|v| Resolution::Message(scalar_text(v))),
        Value::String(s) => Some(Resolution::Message(s.clone())),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
