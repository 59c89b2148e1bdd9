use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const FALLBACK_CREDENTIALS_FILE: &str = ".imena_credentials.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the API; request paths are appended to it.
    pub api_url: String,
    /// Where the token pair is persisted between runs.
    pub credentials_file: PathBuf,
    /// Per-request timeout. None keeps the HTTP client default.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Replace the API URL (e.g. from a command-line flag).
    pub fn with_api_url(mut self, url: &str) -> anyhow::Result<Self> {
        self.api_url = validate_url(url)?;
        Ok(self)
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build the config from any key lookup. `load` uses the process env.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let api_url = lookup("IMENA_API_URL")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.into());

    Ok(Config {
        api_url: validate_url(&api_url)?,
        credentials_file: lookup("IMENA_CREDENTIALS_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_credentials_file),
        request_timeout: lookup("IMENA_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
    })
}

fn validate_url(raw: &str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("IMENA_API_URL '{}' is not a valid URL: {}", raw, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("IMENA_API_URL must use http or https, got '{}'", parsed.scheme());
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

fn default_credentials_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("imena").join("credentials.json"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CREDENTIALS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert!(c.request_timeout.is_none());
        assert!(c.credentials_file.ends_with("credentials.json"));
    }

    #[test]
    fn test_overrides() {
        let c = cfg(&[
            ("IMENA_API_URL", "https://api.imena.rw/"),
            ("IMENA_CREDENTIALS_FILE", "/tmp/creds.json"),
            ("IMENA_REQUEST_TIMEOUT_SECS", "15"),
        ])
        .unwrap();
        assert_eq!(c.api_url, "https://api.imena.rw");
        assert_eq!(c.credentials_file, PathBuf::from("/tmp/creds.json"));
        assert_eq!(c.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_bad_timeout_is_ignored() {
        let c = cfg(&[("IMENA_REQUEST_TIMEOUT_SECS", "soon")]).unwrap();
        assert!(c.request_timeout.is_none());
        let c = cfg(&[("IMENA_REQUEST_TIMEOUT_SECS", "0")]).unwrap();
        assert!(c.request_timeout.is_none());
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(cfg(&[("IMENA_API_URL", "not a url")]).is_err());
        assert!(cfg(&[("IMENA_API_URL", "ftp://example.com")]).is_err());
        assert!(cfg(&[]).unwrap().with_api_url("localhost:8000").is_err());
    }
}
