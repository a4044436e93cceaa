//! Configuration management for the HubSpot MCP Server.
//!
//! This module handles loading and validating configuration from environment variables.
//! It avoids polluting stdout (which MCP uses for communication) by loading the .env
//! file through dotenvy, which never prints.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;

/// Default HubSpot API base URL.
pub const DEFAULT_HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";

/// Default Microsoft identity platform authority.
pub const DEFAULT_MS_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Default Microsoft Graph base URL.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Configuration for the HubSpot MCP Server.
#[derive(Debug, Clone)]
pub struct Config {
    /// HubSpot private app token. Tools report its absence per call.
    pub hubspot_access_token: Option<String>,

    /// HubSpot API base URL
    pub hubspot_base_url: String,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout: u64,

    /// Azure app registration used for Teams transcript downloads
    pub ms_client_id: Option<String>,

    /// Identity platform tenant segment (default: "organizations")
    pub ms_tenant_id: String,

    /// Identity platform authority URL
    pub ms_authority_url: String,

    /// Microsoft Graph base URL
    pub graph_base_url: String,

    /// Where the OAuth authentication record is cached
    pub auth_record_path: PathBuf,

    /// IANA zone assumed for call and meeting times (default: America/Edmonton)
    pub default_timezone: String,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `HUBSPOT_ACCESS_TOKEN`: HubSpot private app token
    /// - `HUBSPOT_BASE_URL`: HubSpot API base URL (default: https://api.hubapi.com)
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 30)
    /// - `MS_CLIENT_ID`: Azure app client ID for transcript downloads
    /// - `MS_TENANT_ID`: Tenant segment (default: organizations)
    /// - `MS_AUTHORITY_URL`: Identity authority (default: https://login.microsoftonline.com)
    /// - `GRAPH_BASE_URL`: Graph API base (default: https://graph.microsoft.com/v1.0)
    /// - `AUTH_RECORD_PATH`: OAuth record file (default: .local/auth_record.json)
    /// - `DEFAULT_TIMEZONE`: Zone for local call/meeting times (default: America/Edmonton)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let hubspot_access_token = Self::optional_var("HUBSPOT_ACCESS_TOKEN");
        let hubspot_base_url = Self::url_var("HUBSPOT_BASE_URL", defaults.hubspot_base_url)?;
        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", defaults.request_timeout)?;
        if request_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                var: "REQUEST_TIMEOUT".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let ms_client_id = Self::optional_var("MS_CLIENT_ID");
        let ms_tenant_id = Self::optional_var("MS_TENANT_ID").unwrap_or(defaults.ms_tenant_id);
        let ms_authority_url = Self::url_var("MS_AUTHORITY_URL", defaults.ms_authority_url)?;
        let graph_base_url = Self::url_var("GRAPH_BASE_URL", defaults.graph_base_url)?;
        let auth_record_path = Self::optional_var("AUTH_RECORD_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.auth_record_path);

        let default_timezone =
            Self::optional_var("DEFAULT_TIMEZONE").unwrap_or(defaults.default_timezone);
        if default_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidValue {
                var: "DEFAULT_TIMEZONE".to_string(),
                reason: format!("Unknown IANA timezone: {}", default_timezone),
            });
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            hubspot_access_token,
            hubspot_base_url,
            request_timeout,
            ms_client_id,
            ms_tenant_id,
            ms_authority_url,
            graph_base_url,
            auth_record_path,
            default_timezone,
            log_level,
        })
    }

    /// Read a variable, treating unset and blank the same.
    fn optional_var(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Read a URL variable, validating the scheme and dropping a trailing slash.
    fn url_var(var_name: &str, default: String) -> ConfigResult<String> {
        let url = Self::optional_var(var_name).unwrap_or(default);
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }
        Ok(url.trim_end_matches('/').to_string())
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hubspot_access_token: None,
            hubspot_base_url: DEFAULT_HUBSPOT_BASE_URL.to_string(),
            request_timeout: 30,
            ms_client_id: None,
            ms_tenant_id: "organizations".to_string(),
            ms_authority_url: DEFAULT_MS_AUTHORITY_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            auth_record_path: PathBuf::from(".local/auth_record.json"),
            default_timezone: "America/Edmonton".to_string(),
            log_level: "error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    // Helper to set and unset env vars for testing
    struct EnvGuard {
        vars: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.vars.push(key.to_string());
        }

        fn unset(&mut self, key: &str) {
            env::remove_var(key);
            self.vars.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.hubspot_base_url, "https://api.hubapi.com");
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.ms_tenant_id, "organizations");
        assert_eq!(config.default_timezone, "America/Edmonton");
        assert!(config.hubspot_access_token.is_none());
    }

    #[test]
    #[serial]
    fn test_config_missing_token_is_not_fatal() {
        let mut guard = EnvGuard::new();
        guard.set("HUBSPOT_ACCESS_TOKEN", "   ");
        guard.unset("HUBSPOT_BASE_URL");

        let config = Config::from_env().unwrap();
        assert!(config.hubspot_access_token.is_none());
        assert_eq!(config.hubspot_base_url, "https://api.hubapi.com");
    }

    #[test]
    #[serial]
    fn test_config_from_env_invalid_url() {
        let mut guard = EnvGuard::new();
        guard.set("HUBSPOT_BASE_URL", "not-a-url");

        let result = Config::from_env();
        match result {
            Err(ConfigError::InvalidValue { var, .. }) => assert_eq!(var, "HUBSPOT_BASE_URL"),
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_valid() {
        let mut guard = EnvGuard::new();
        guard.set("HUBSPOT_ACCESS_TOKEN", "pat-na1-123");
        guard.set("HUBSPOT_BASE_URL", "http://localhost:9999/");
        guard.set("REQUEST_TIMEOUT", "5");
        guard.set("MS_CLIENT_ID", "client-abc");
        guard.set("AUTH_RECORD_PATH", "/tmp/record.json");

        let config = Config::from_env().unwrap();
        assert_eq!(config.hubspot_access_token.as_deref(), Some("pat-na1-123"));
        assert_eq!(config.hubspot_base_url, "http://localhost:9999");
        assert_eq!(config.request_timeout, 5);
        assert_eq!(config.ms_client_id.as_deref(), Some("client-abc"));
        assert_eq!(config.auth_record_path, PathBuf::from("/tmp/record.json"));
    }

    #[test]
    #[serial]
    fn test_config_invalid_timezone() {
        let mut guard = EnvGuard::new();
        guard.set("DEFAULT_TIMEZONE", "Atlantis/Central");

        match Config::from_env() {
            Err(ConfigError::InvalidValue { var, .. }) => assert_eq!(var, "DEFAULT_TIMEZONE"),
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_parse_env_u64_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_U64_INVALID", "not-a-number");

        let result = Config::parse_env_u64("TEST_U64_INVALID", 10);
        assert!(result.is_err());

        let result = Config::parse_env_u64("NONEXISTENT_U64", 10);
        assert_eq!(result.unwrap(), 10);
    }
}
