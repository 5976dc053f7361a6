//! Provider configuration.
//!
//! Every setting can come from the provider block or, when left blank there,
//! from the environment.

use serde::Deserialize;
use std::env;

use crate::error::ConfigError;

/// Environment variable for the Jira site.
pub const ENV_DOMAIN: &str = "JIRA_DOMAIN";
/// Environment variable for the account email used with basic auth.
pub const ENV_EMAIL: &str = "JIRA_USER_EMAIL";
/// Environment variable for the Jira API token.
pub const ENV_TOKEN: &str = "JIRA_TOKEN";
/// Environment variable for the organization admin API key.
pub const ENV_ADMIN_TOKEN: &str = "ADMIN_TOKEN";
/// Environment variable overriding the admin API base URL.
pub const ENV_ADMIN_URL: &str = "JIRA_ADMIN_URL";

/// Provider block settings.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Jira site name or URL.
    pub domain: String,
    /// Account email for basic auth.
    pub email: String,
    /// Jira API token.
    pub token: String,
    /// Organization admin API key.
    pub admin_token: String,
    /// Admin API base URL; `https://api.atlassian.com` when unset.
    pub admin_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain)
            .field("email", &self.email)
            .field("token", &redact(&self.token))
            .field("admin_token", &redact(&self.admin_token))
            .field("admin_url", &self.admin_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl ProviderConfig {
    /// Load every setting from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().resolve()
    }

    /// Fill blank settings from the process environment.
    #[must_use]
    pub fn resolve(self) -> Self {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Fill blank settings using `lookup` for environment values.
    #[must_use]
    pub fn resolve_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fill = |value: String, key: &str| {
            if value.trim().is_empty() {
                lookup(key).unwrap_or_default()
            } else {
                value
            }
        };

        let admin_url = self
            .admin_url
            .filter(|s| !s.trim().is_empty())
            .or_else(|| lookup(ENV_ADMIN_URL).filter(|s| !s.trim().is_empty()));

        Self {
            domain: fill(self.domain, ENV_DOMAIN),
            email: fill(self.email, ENV_EMAIL),
            token: fill(self.token, ENV_TOKEN),
            admin_token: fill(self.admin_token, ENV_ADMIN_TOKEN),
            admin_url,
        }
    }

    /// Check that every required setting is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("domain", ENV_DOMAIN, &self.domain),
            ("email", ENV_EMAIL, &self.email),
            ("token", ENV_TOKEN, &self.token),
            ("admin_token", ENV_ADMIN_TOKEN, &self.admin_token),
        ];

        for (field, env, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { field, env });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn complete() -> ProviderConfig {
        ProviderConfig {
            domain: "acme".to_string(),
            email: "me@example.com".to_string(),
            token: "t".to_string(),
            admin_token: "a".to_string(),
            admin_url: None,
        }
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        let config = complete().resolve_with(lookup_from(&[(ENV_DOMAIN, "other")]));
        assert_eq!(config.domain, "acme");
    }

    #[test]
    fn test_blank_values_fall_back_to_env() {
        let config = ProviderConfig {
            domain: "  ".to_string(),
            ..complete()
        }
        .resolve_with(lookup_from(&[
            (ENV_DOMAIN, "from-env"),
            (ENV_ADMIN_URL, "http://localhost:9000"),
        ]));

        assert_eq!(config.domain, "from-env");
        assert_eq!(config.admin_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_first_missing_setting() {
        let config = ProviderConfig {
            token: String::new(),
            admin_token: String::new(),
            ..complete()
        }
        .resolve_with(lookup_from(&[]));

        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "token",
                env: ENV_TOKEN,
            })
        );
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", complete());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("token: \"t\""));

        let debug = format!("{:?}", ProviderConfig::default());
        assert!(debug.contains("<unset>"));
    }

    #[test]
    fn test_deserializes_partial_block() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"domain": "acme", "email": "me@example.com"}"#).unwrap();
        assert_eq!(config.domain, "acme");
        assert!(config.token.is_empty());
        assert!(config.admin_url.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        env::set_var(ENV_DOMAIN, "env-site");
        env::set_var(ENV_EMAIL, "env@example.com");
        env::set_var(ENV_TOKEN, "env-token");
        env::set_var(ENV_ADMIN_TOKEN, "env-admin");

        let config = ProviderConfig::from_env();

        env::remove_var(ENV_DOMAIN);
        env::remove_var(ENV_EMAIL);
        env::remove_var(ENV_TOKEN);
        env::remove_var(ENV_ADMIN_TOKEN);

        assert_eq!(config.domain, "env-site");
        assert_eq!(config.admin_token, "env-admin");
        assert!(config.validate().is_ok());
    }
}
