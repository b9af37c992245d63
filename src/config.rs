//! Demo server configuration.
//!
//! Loaded from environment variables with `envy`, after an optional `.env` file.

use serde::Deserialize;

/// Configuration for the demo server.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `BASIC_USERNAME` / `BASIC_PASSWORD` (optional): enables Basic auth when both are set
/// - `API_KEYS` (optional): comma-separated `owner=key` pairs
/// - `BEARER_TOKENS` (optional): comma-separated `subject=token` pairs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    pub basic_username: Option<String>,

    pub basic_password: Option<String>,

    #[serde(default)]
    pub api_keys: Vec<String>,

    #[serde(default)]
    pub bearer_tokens: Vec<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Basic auth credentials, when both halves are configured.
    pub fn basic_credentials(&self) -> Option<(&str, &str)> {
        Some((self.basic_username.as_deref()?, self.basic_password.as_deref()?))
    }

    /// `API_KEYS` as `(owner, key)` pairs. Malformed entries are skipped.
    pub fn api_key_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        pairs(&self.api_keys)
    }

    /// `BEARER_TOKENS` as `(subject, token)` pairs. Malformed entries are skipped.
    pub fn bearer_token_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        pairs(&self.bearer_tokens)
    }
}

fn pairs(entries: &[String]) -> impl Iterator<Item = (&str, &str)> {
    entries.iter().filter_map(|entry| {
        let pair = entry.trim().split_once('=');
        if pair.is_none() {
            tracing::warn!("ignoring malformed credential entry, expected name=secret");
        }
        pair
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_credentials_need_both_halves() {
        let mut config = Config {
            basic_username: Some("admin".into()),
            ..Config::default()
        };
        assert_eq!(config.basic_credentials(), None);

        config.basic_password = Some("admin123".into());
        assert_eq!(config.basic_credentials(), Some(("admin", "admin123")));
    }

    #[test]
    fn malformed_pairs_are_skipped() {
        let config = Config {
            api_keys: vec!["acme=k1".into(), "broken".into(), " globex=k2 ".into()],
            ..Config::default()
        };

        let pairs: Vec<_> = config.api_key_pairs().collect();
        assert_eq!(pairs, vec![("acme", "k1"), ("globex", "k2")]);
    }
}
