use serde::{Deserialize, Serialize};

/// Server-side role of an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Rider,
    CooperativeAdmin,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Rider => "RIDER",
            Role::CooperativeAdmin => "COOPERATIVE_ADMIN",
            Role::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Current user as returned by `GET /api/users/me/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Identity {
    /// Email if set, otherwise phone number.
    pub fn email_or_phone(&self) -> Option<&str> {
        [self.email.as_deref(), self.phone_number.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::CooperativeAdmin || self.is_superuser
    }
}

/// Role requested at signup. Serialized lowercase as the register endpoint
/// expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignupRole {
    Rider,
    Administrator,
}

/// Body of `POST /api/users/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub role: SignupRole,
    /// Riders join exactly one cooperative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooperative_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    /// Cooperatives an administrator asks to manage.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cooperatives: Vec<i64>,
}

/// Acknowledgement returned by the register endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Greeting name derived from a login identifier.
///
/// Emails use their local part with `.`, `_` and `-` runs turned into spaces
/// and each word capitalized; anything else (a phone number) is returned
/// trimmed.
pub fn display_name(identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return String::new();
    }
    let Some((local, _)) = identifier.split_once('@') else {
        return identifier.to_string();
    };

    let mut out = String::with_capacity(local.len());
    let mut in_separator = false;
    for c in local.trim().chars() {
        if matches!(c, '.' | '_' | '-') {
            if !in_separator {
                out.push(' ');
                in_separator = true;
            }
            continue;
        }
        in_separator = false;
        let at_word_start = out
            .chars()
            .last()
            .map(|prev| !prev.is_alphanumeric())
            .unwrap_or(true);
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
