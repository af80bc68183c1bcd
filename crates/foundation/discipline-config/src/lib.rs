//! Discipline API configuration
//!
//! Resolution order: built-in defaults, then a YAML file, then
//! `DISCIPLINE_*` environment variables.
//!
//! ```yaml
//! api_url: https://erp.example.com/api/app
//! token_url: https://erp.example.com/connect/token
//! client_id: Cxm_App
//! username: admin
//! password: secret
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use discipline_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "DISCIPLINE_API_URL";
pub const ENV_TOKEN_URL: &str = "DISCIPLINE_TOKEN_URL";
pub const ENV_CLIENT_ID: &str = "DISCIPLINE_CLIENT_ID";
pub const ENV_USERNAME: &str = "DISCIPLINE_USERNAME";
pub const ENV_PASSWORD: &str = "DISCIPLINE_PASSWORD";
pub const ENV_SCOPE: &str = "DISCIPLINE_SCOPE";
pub const ENV_PAGE_SIZE: &str = "DISCIPLINE_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "DISCIPLINE_TIMEOUT_SECS";

/// Remote API endpoints, credentials and request policy
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base of the application API; `/discipline` and `/project` hang off it
    pub api_url: String,
    /// Password-grant token endpoint
    pub token_url: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub scope: String,
    /// `MaxResultCount` for snapshot fetches
    pub page_size: u32,
    pub timeout_secs: u64,
    /// Forms refuse to submit without a project
    pub require_project: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:44300/api/app".into(),
            token_url: "http://127.0.0.1:44300/connect/token".into(),
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
            scope: "offline_access CxmApi".into(),
            page_size: 500,
            timeout_secs: 10,
            require_project: true,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("scope", &self.scope)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("require_project", &self.require_project)
            .finish()
    }
}

impl ApiConfig {
    /// Default config file location (~/.config/discipline/config.yaml)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("discipline")
            .join("config.yaml")
    }

    /// Load from `path` (or the default location if it exists), then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file. Absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Override fields from an environment lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text_fields: [(&str, &mut String); 6] = [
            (ENV_API_URL, &mut self.api_url),
            (ENV_TOKEN_URL, &mut self.token_url),
            (ENV_CLIENT_ID, &mut self.client_id),
            (ENV_USERNAME, &mut self.username),
            (ENV_PASSWORD, &mut self.password),
            (ENV_SCOPE, &mut self.scope),
        ];
        for (key, field) in text_fields {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            self.page_size = value
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_PAGE_SIZE}: not a number: {value}")))?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = value
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_TIMEOUT_SECS}: not a number: {value}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (label, value) in [("api_url", &self.api_url), ("token_url", &self.token_url)] {
            let parsed = url::Url::parse(value)
                .map_err(|e| Error::Config(format!("{label}: {e}: {value}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!("{label}: unsupported scheme: {value}")));
            }
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be positive".into()));
        }
        Ok(())
    }

    /// Whether the password grant can be attempted at all
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.username.is_empty()
    }

    pub fn discipline_url(&self) -> String {
        format!("{}/discipline", self.api_url.trim_end_matches('/'))
    }

    /// Record URL with `id` as a single encoded path segment
    pub fn discipline_item_url(&self, id: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.discipline_url())
            .map_err(|e| Error::Config(format!("api_url: {e}: {}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("api_url: not a base URL: {}", self.api_url)))?
            .push(id);
        Ok(url.into())
    }

    pub fn project_url(&self) -> String {
        format!("{}/project", self.api_url.trim_end_matches('/'))
    }

    /// Point both endpoints at one host, the way the server lays them out
    pub fn for_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            api_url: format!("{host}/api/app"),
            token_url: format!("{host}/connect/token"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 500);
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_endpoint_urls() {
        let config = ApiConfig::for_host("https://erp.example.com/");
        assert_eq!(config.discipline_url(), "https://erp.example.com/api/app/discipline");
        assert_eq!(
            config.discipline_item_url("abc").unwrap(),
            "https://erp.example.com/api/app/discipline/abc"
        );
        assert_eq!(config.project_url(), "https://erp.example.com/api/app/project");
        assert_eq!(config.token_url, "https://erp.example.com/connect/token");
    }

    #[test]
    fn test_item_id_stays_one_segment() {
        let config = ApiConfig::for_host("https://erp.example.com");

        let url = config.discipline_item_url("x/../y").unwrap();
        assert_eq!(url, "https://erp.example.com/api/app/discipline/x%2F..%2Fy");

        let url = config.discipline_item_url("a b?c").unwrap();
        assert_eq!(url, "https://erp.example.com/api/app/discipline/a%20b%3Fc");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApiConfig::default();
        config
            .apply_env_from(lookup(&[
                (ENV_API_URL, "https://erp.example.com/api/app"),
                (ENV_USERNAME, "admin"),
                (ENV_CLIENT_ID, "Cxm_App"),
                (ENV_PAGE_SIZE, " 250 "),
            ]))
            .unwrap();

        assert_eq!(config.api_url, "https://erp.example.com/api/app");
        assert_eq!(config.page_size, 250);
        assert!(config.has_credentials());
        assert_eq!(config.scope, "offline_access CxmApi");
    }

    #[test]
    fn test_bad_number_in_env() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_env_from(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let config = ApiConfig {
            api_url: "not a url".into(),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            token_url: "ftp://host/connect/token".into(),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ApiConfig {
            page_size: 0,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_then_env() {
        let path = std::env::temp_dir().join(format!("discipline-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "api_url: https://file.example.com/api/app\nusername: from-file\npage_size: 100\n",
        )
        .unwrap();

        let mut config = ApiConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.username, "from-file");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.timeout_secs, 10);

        config.apply_env_from(lookup(&[(ENV_USERNAME, "from-env")])).unwrap();
        assert_eq!(config.username, "from-env");
        assert_eq!(config.api_url, "https://file.example.com/api/app");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ApiConfig {
            password: "hunter2".into(),
            ..ApiConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
