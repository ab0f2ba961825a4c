//! Provider connection settings
//!
//! Values come from the provider configuration block; anything left empty falls
//! back to the `NXRM_SERVER_*` environment variables.

use std::fmt;

use url::Url;

use crate::error::{ClientError, Result};

/// Environment variable for the server URL
pub const ENV_URL: &str = "NXRM_SERVER_URL";
/// Environment variable for the username
pub const ENV_USERNAME: &str = "NXRM_SERVER_USERNAME";
/// Environment variable for the password
pub const ENV_PASSWORD: &str = "NXRM_SERVER_PASSWORD";

/// Default REST API prefix
pub const DEFAULT_API_BASE_PATH: &str = "/service/rest";
/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Connection settings for one server
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. `https://nexus.example.com`
    pub url: String,
    pub username: String,
    pub password: String,
    /// REST API prefix appended to `url`
    pub api_base_path: String,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            api_base_path: DEFAULT_API_BASE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_base_path", &self.api_base_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Fill empty fields from the process environment
    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks(|key| std::env::var(key).ok())
    }

    /// Fill empty fields from a variable lookup
    pub fn with_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fill = |field: &mut String, key: &str| {
            if field.is_empty() {
                if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                    *field = value;
                }
            }
        };
        fill(&mut self.url, ENV_URL);
        fill(&mut self.username, ENV_USERNAME);
        fill(&mut self.password, ENV_PASSWORD);
        self
    }

    /// Check the settings before any request is issued
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ClientError::InvalidConfig {
                message: format!("url is required (or set {})", ENV_URL),
            });
        }
        let parsed = Url::parse(&self.url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig {
                message: format!("url must use http:// or https://, got {}", self.url),
            });
        }
        if self.username.is_empty() {
            return Err(ClientError::InvalidConfig {
                message: format!("username is required (or set {})", ENV_USERNAME),
            });
        }
        if self.password.is_empty() {
            return Err(ClientError::InvalidConfig {
                message: format!("password is required (or set {})", ENV_PASSWORD),
            });
        }
        if self.timeout == 0 {
            return Err(ClientError::InvalidConfig {
                message: "timeout must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute URL of the REST API root, without a trailing slash
    pub fn api_root(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let path = self.api_base_path.trim_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_fallbacks_fill_only_empty_fields() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://env.example.com"),
            (ENV_USERNAME, "env-user"),
            (ENV_PASSWORD, "env-pass"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::new("", "admin", "")
            .with_fallbacks(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.url, "https://env.example.com");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "env-pass");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::new("ftp://nexus", "admin", "admin123");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = ClientConfig::new("http://localhost:8081", "", "");
        assert!(config.validate().unwrap_err().to_string().contains("username"));
    }

    #[test]
    fn test_api_root() {
        let mut config = ClientConfig::new("http://localhost:8081/", "a", "b");
        assert_eq!(config.api_root(), "http://localhost:8081/service/rest");

        config.api_base_path = "/nexus/service/rest/".to_string();
        assert_eq!(config.api_root(), "http://localhost:8081/nexus/service/rest");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ClientConfig::new("http://localhost:8081", "admin", "admin123");
        assert!(!format!("{:?}", config).contains("admin123"));
    }
}
