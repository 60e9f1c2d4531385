//! Gateway configuration types.
//!
//! This module defines the configuration for the SourceBox gateway and how
//! it is read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sourcebox_auth::DEFAULT_API_URL;
use sourcebox_ingest::git::RepoSources;
use sourcebox_ingest::UnsupportedPolicy;
use thiserror::Error;

/// An environment variable held a value that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    /// The offending variable.
    pub var: &'static str,
    /// The raw value.
    pub value: String,
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the remote auth and pack API.
    #[serde(default = "GatewayConfig::default_api_url")]
    pub api_url: String,

    /// External sign-up page. When unset, registration is proxied to the
    /// remote API.
    #[serde(default)]
    pub signup_url: Option<String>,

    /// Root directory for per-session scratch directories.
    #[serde(default = "GatewayConfig::default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Path-style S3 endpoint override. Public AWS endpoints when unset.
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// Handling of uploads outside the extension allow-list.
    #[serde(default)]
    pub unsupported_files: UnsupportedPolicy,

    /// Whether `fetch-repo` may clone `file://` URLs and paths on this host.
    #[serde(default)]
    pub allow_local_repos: bool,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Whether the session cookie is marked `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,

    /// Idle time after which a session is dropped, in seconds.
    #[serde(default = "GatewayConfig::default_session_idle")]
    pub session_idle_seconds: u64,

    /// How long a resolved premium entitlement is reused, in seconds.
    #[serde(default = "GatewayConfig::default_premium_cache")]
    pub premium_cache_seconds: u64,

    /// Timeout for outbound HTTP calls, in seconds.
    #[serde(default = "GatewayConfig::default_http_timeout")]
    pub http_timeout_seconds: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_api_url() -> String {
        DEFAULT_API_URL.to_string()
    }

    fn default_workspace_dir() -> PathBuf {
        PathBuf::from("./workspace")
    }

    const fn default_session_idle() -> u64 {
        86_400 // 24 hours
    }

    const fn default_premium_cache() -> u64 {
        60
    }

    const fn default_http_timeout() -> u64 {
        30
    }

    const fn default_max_body() -> usize {
        32 * 1024 * 1024 // 32 MiB
    }

    const fn default_request_timeout() -> u64 {
        300 // clones and bucket dumps are slow
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through a variable lookup function. Unset and
    /// empty variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            listen_addr: get("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            api_url: get("API_URL").unwrap_or(defaults.api_url),
            signup_url: get("SIGNUP_URL"),
            workspace_dir: get("WORKSPACE_DIR").map_or(defaults.workspace_dir, PathBuf::from),
            s3_endpoint: get("S3_ENDPOINT"),
            unsupported_files: parse(&get, "UNSUPPORTED_FILES", defaults.unsupported_files)?,
            allow_local_repos: parse(&get, "ALLOW_LOCAL_REPOS", defaults.allow_local_repos)?,
            cors_origins: get("CORS_ORIGINS").map_or(defaults.cors_origins, |v| {
                v.split(',').map(|o| o.trim().to_string()).collect()
            }),
            cookie_secure: parse(&get, "COOKIE_SECURE", defaults.cookie_secure)?,
            session_idle_seconds: parse(&get, "SESSION_IDLE_SECONDS", defaults.session_idle_seconds)?,
            premium_cache_seconds: parse(
                &get,
                "PREMIUM_CACHE_SECONDS",
                defaults.premium_cache_seconds,
            )?,
            http_timeout_seconds: parse(&get, "HTTP_TIMEOUT_SECONDS", defaults.http_timeout_seconds)?,
            max_body_bytes: parse(&get, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            request_timeout_seconds: parse(
                &get,
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,
        })
    }

    /// Repository locations `fetch-repo` may clone from.
    #[must_use]
    pub const fn repo_sources(&self) -> RepoSources {
        if self.allow_local_repos {
            RepoSources::AllowLocal
        } else {
            RepoSources::RemoteOnly
        }
    }

    /// Get the session idle timeout as a `Duration`.
    #[must_use]
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_seconds)
    }

    /// Get the premium entitlement cache TTL as a `Duration`.
    #[must_use]
    pub fn premium_cache(&self) -> Duration {
        Duration::from_secs(self.premium_cache_seconds)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { var, value }),
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            api_url: Self::default_api_url(),
            signup_url: None,
            workspace_dir: Self::default_workspace_dir(),
            s3_endpoint: None,
            unsupported_files: UnsupportedPolicy::default(),
            allow_local_repos: false,
            cors_origins: vec!["*".to_string()],
            cookie_secure: false,
            session_idle_seconds: Self::default_session_idle(),
            premium_cache_seconds: Self::default_premium_cache(),
            http_timeout_seconds: Self::default_http_timeout(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
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
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.unsupported_files, UnsupportedPolicy::Placeholder);
        assert_eq!(config.max_body_bytes, 32 * 1024 * 1024);
        assert!(config.signup_url.is_none());
        assert_eq!(config.repo_sources(), RepoSources::RemoteOnly);
    }

    #[test]
    fn local_repos_are_opt_in() {
        let config = GatewayConfig::from_lookup(lookup(&[("ALLOW_LOCAL_REPOS", "true")])).unwrap();
        assert_eq!(config.repo_sources(), RepoSources::AllowLocal);

        let err = GatewayConfig::from_lookup(lookup(&[("ALLOW_LOCAL_REPOS", "yes")])).unwrap_err();
        assert_eq!(err.var, "ALLOW_LOCAL_REPOS");
    }

    #[test]
    fn timeout_durations() {
        let config = GatewayConfig::default();
        assert_eq!(config.session_idle(), Duration::from_secs(86_400));
        assert_eq!(config.premium_cache(), Duration::from_secs(60));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("API_URL", "http://localhost:5000"),
            ("SIGNUP_URL", "https://example.com/signup"),
            ("UNSUPPORTED_FILES", "skip"),
            ("PREMIUM_CACHE_SECONDS", "5"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.signup_url.as_deref(), Some("https://example.com/signup"));
        assert_eq!(config.unsupported_files, UnsupportedPolicy::Skip);
        assert_eq!(config.premium_cache_seconds, 5);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.session_idle_seconds, 86_400);
    }

    #[test]
    fn empty_values_use_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[("SIGNUP_URL", " ")])).unwrap();
        assert!(config.signup_url.is_none());
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = GatewayConfig::from_lookup(lookup(&[("MAX_BODY_BYTES", "lots")])).unwrap_err();
        assert_eq!(err.var, "MAX_BODY_BYTES");
        assert_eq!(err.value, "lots");
    }
}
