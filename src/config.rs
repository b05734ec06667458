//! Dispatcher configuration.
//!
//! Everything has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! method_not_allowed = true
//! log_requests = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// How [`Router::dispatch`](crate::Router::dispatch) behaves around lookups.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Answer `405 Method Not Allowed` (with an `allow` header) instead of
    /// `404` when the path matched but the verb has no handler.
    pub method_not_allowed: bool,

    /// Wrap every dispatched request in [`middleware::trace`](crate::middleware::trace).
    pub log_requests: bool,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Applies environment overrides on top of `self`.
    ///
    /// - `ARBOR_METHOD_NOT_ALLOWED` (`true` / `false`)
    /// - `ARBOR_LOG_REQUESTS` (`true` / `false`)
    pub fn with_env_override(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self> {
        let flag = |name: &'static str, current: bool| -> Result<bool> {
            match lookup(name) {
                Some(value) => value.trim().parse().map_err(|_| Error::Env { name, value }),
                None => Ok(current),
            }
        };
        self.method_not_allowed = flag("ARBOR_METHOD_NOT_ALLOWED", self.method_not_allowed)?;
        self.log_requests = flag("ARBOR_LOG_REQUESTS", self.log_requests)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_fields() {
        let config = Config::from_toml_str("method_not_allowed = true").unwrap();
        assert!(config.method_not_allowed);
        assert!(!config.log_requests);
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(matches!(
            Config::from_toml_str("log_requests = \"yes\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(|name| (name == "ARBOR_LOG_REQUESTS").then(|| "true".to_owned()))
            .unwrap();
        assert!(config.log_requests);
        assert!(!config.method_not_allowed);

        let err = Config::default()
            .with_overrides(|_| Some("maybe".to_owned()))
            .unwrap_err();
        assert!(matches!(err, Error::Env { name: "ARBOR_METHOD_NOT_ALLOWED", .. }));
    }
}
