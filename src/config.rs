use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the primary store URI.
pub const STORE_URI_VAR: &str = "QUOTESTASH_STORE_URI";
/// Environment variable holding the fallback directory.
pub const STORE_DIR_VAR: &str = "QUOTESTASH_DIR";
/// Credential of the upstream assistant service. The store never uses it, but a
/// process without it is misconfigured.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

pub const DEFAULT_STORE_URI: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_STORE_DIR: &str = "quotes";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is missing in the environment variables")]
    Missing(&'static str),
}

/// Process configuration read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub store_uri: String,
    pub store_dir: PathBuf,
    pub openai_api_key: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("store_uri", &self.store_uri)
            .field("store_dir", &self.store_dir)
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads `.env` if one exists, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let openai_api_key = get(OPENAI_API_KEY_VAR).ok_or(ConfigError::Missing(OPENAI_API_KEY_VAR))?;

        Ok(Self {
            store_uri: get(STORE_URI_VAR).unwrap_or_else(|| DEFAULT_STORE_URI.to_string()),
            store_dir: get(STORE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
            openai_api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[(OPENAI_API_KEY_VAR, "sk-test")])).unwrap();
        assert_eq!(config.store_uri, DEFAULT_STORE_URI);
        assert_eq!(config.store_dir, PathBuf::from("quotes"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (OPENAI_API_KEY_VAR, "sk-test"),
            (STORE_URI_VAR, "postgres://localhost/quotes"),
            (STORE_DIR_VAR, "/var/lib/quotes"),
        ]))
        .unwrap();
        assert_eq!(config.store_uri, "postgres://localhost/quotes");
        assert_eq!(config.store_dir, PathBuf::from("/var/lib/quotes"));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(OPENAI_API_KEY_VAR))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[(OPENAI_API_KEY_VAR, "  ")])),
            Err(ConfigError::Missing(OPENAI_API_KEY_VAR))
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config::from_lookup(lookup(&[(OPENAI_API_KEY_VAR, "sk-secret")])).unwrap();
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}
