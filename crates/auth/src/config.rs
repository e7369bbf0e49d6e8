//! Auth configuration and the startup invariant on the signing secret.
//!
//! There is no default secret in any profile: a missing or blank `JWT_SECRET`
//! is a fatal startup error.

use std::time::Duration;

use thiserror::Error;

use crate::{DEFAULT_SESSION_COOKIE, DEFAULT_SWEEP_INTERVAL};

pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
pub const ENV_COOKIE_NAME: &str = "AUTH_COOKIE_NAME";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "REVOCATION_SWEEP_INTERVAL_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSigningSecret,

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    signing_secret: String,
    pub cookie_name: String,
    pub sweep_interval: Duration,
}

impl AuthConfig {
    /// Build a config around an explicit secret, with default cookie and sweep settings.
    pub fn new(signing_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let signing_secret = signing_secret.into();
        if signing_secret.trim().is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }

        Ok(Self {
            signing_secret,
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] but reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup(ENV_JWT_SECRET).unwrap_or_default())?;

        if let Some(name) = lookup(ENV_COOKIE_NAME) {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid {
                    key: ENV_COOKIE_NAME,
                    reason: "must not be empty".to_string(),
                });
            }
            config.cookie_name = name.to_string();
        }

        if let Some(raw) = lookup(ENV_SWEEP_INTERVAL_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: ENV_SWEEP_INTERVAL_SECS,
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_SWEEP_INTERVAL_SECS,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.sweep_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        assert_eq!(
            AuthConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingSigningSecret)
        );
    }

    #[test]
    fn blank_secret_is_fatal() {
        assert_eq!(
            AuthConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "   ")])),
            Err(ConfigError::MissingSigningSecret)
        );
    }

    #[test]
    fn defaults_apply() {
        let config = AuthConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "s3cret")])).unwrap();

        assert_eq!(config.signing_secret(), "s3cret");
        assert_eq!(config.cookie_name, DEFAULT_SESSION_COOKIE);
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn overrides_are_read() {
        let config = AuthConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "s3cret"),
            (ENV_COOKIE_NAME, "sid"),
            (ENV_SWEEP_INTERVAL_SECS, "30"),
        ]))
        .unwrap();

        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
    }

    #[test]
    fn zero_or_garbage_interval_is_rejected() {
        for raw in ["0", "soon", "-5"] {
            let err = AuthConfig::from_lookup(lookup(&[
                (ENV_JWT_SECRET, "s3cret"),
                (ENV_SWEEP_INTERVAL_SECS, raw),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: ENV_SWEEP_INTERVAL_SECS, .. }),
                "raw: {raw}"
            );
        }
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = AuthConfig::new("do-not-print").unwrap();
        assert!(!format!("{config:?}").contains("do-not-print"));
    }
}
