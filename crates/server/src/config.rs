use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Timing of the client bootstrap that runs after startup.
#[derive(Clone, Debug, Deserialize)]
pub struct BootstrapConfig {
    /// Overall deadline for the readiness wait.
    #[serde(default = "default_bootstrap_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between two readiness probes.
    #[serde(default = "default_bootstrap_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_bootstrap_max_attempts")]
    pub max_attempts: u32,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_bootstrap_timeout_secs(),
            interval_ms: default_bootstrap_interval_ms(),
            max_attempts: default_bootstrap_max_attempts(),
        }
    }
}

impl BootstrapConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Admin API of the authorization server (challenge lookups, accepts, client registration).
    pub hydra_admin_url: String,
    /// Public endpoint of the authorization server (readiness probe, redirect targets).
    pub hydra_public_url: String,
    /// Issuer URI; preferred over `hydra_public_url` when rewriting redirects.
    #[serde(default)]
    pub issuer_uri: String,
    /// Externally reachable replacement for the host found in redirect targets.
    #[serde(default)]
    pub alternative_redirect_hydra_url: String,
    #[serde(default)]
    pub skip_tls_verify: bool,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Prefix for every route, e.g. `/idp`. Empty mounts at the root.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_clients_file")]
    pub clients_file: PathBuf,
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Checks the values that cannot be expressed through serde defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("hydra_admin_url", &self.hydra_admin_url)?;
        validate_http_url("hydra_public_url", &self.hydra_public_url)?;
        if self.bootstrap.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "bootstrap.max_attempts must be > 0".into(),
            ));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "base_path must be empty or start with '/'".into(),
            ));
        }
        Ok(())
    }

    /// Base path without a trailing slash; `/` collapses to the empty string.
    pub fn normalized_base_path(&self) -> String {
        self.base_path.trim_end_matches('/').to_string()
    }
}

/// Settings of the demo OAuth client binary.
#[derive(Clone, Debug, Deserialize)]
pub struct DemoClientConfig {
    pub auth_url: String,
    pub token_url: String,
    pub redirect_url: String,
    #[serde(default = "default_demo_client_id")]
    pub client_id: String,
    #[serde(default = "default_demo_client_secret")]
    pub client_secret: String,
    #[serde(default = "default_demo_scope")]
    pub scope: String,
    #[serde(default = "default_demo_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_demo_skip_tls_verify")]
    pub skip_tls_verify: bool,
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,
    #[serde(default = "default_state_capacity")]
    pub state_capacity: usize,
}

impl DemoClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("auth_url", &self.auth_url)?;
        validate_http_url("token_url", &self.token_url)?;
        validate_http_url("redirect_url", &self.redirect_url)?;
        if self.state_capacity == 0 {
            return Err(ConfigError::Validation("state_capacity must be > 0".into()));
        }
        Ok(())
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let uri: hyper::Uri = value
        .parse()
        .map_err(|e| ConfigError::Validation(format!("{key} is not a valid URL: {e}")))?;
    match (uri.scheme_str(), uri.host()) {
        (Some("http" | "https"), Some(_)) => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "{key} must be an absolute http(s) URL, got {value:?}"
        ))),
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".into()
}

fn default_base_path() -> String {
    "/idp".into()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_clients_file() -> PathBuf {
    PathBuf::from("import/clients.json")
}

fn default_users_file() -> PathBuf {
    PathBuf::from("import/users.json")
}

fn default_bootstrap_timeout_secs() -> u64 {
    60
}

fn default_bootstrap_interval_ms() -> u64 {
    1000
}

fn default_bootstrap_max_attempts() -> u32 {
    100
}

fn default_demo_client_id() -> String {
    "myclient".into()
}

fn default_demo_client_secret() -> String {
    "secret".into()
}

fn default_demo_scope() -> String {
    "openid".into()
}

fn default_demo_listen_addr() -> String {
    "0.0.0.0:3001".into()
}

fn default_demo_skip_tls_verify() -> bool {
    true
}

fn default_state_ttl_secs() -> u64 {
    600
}

fn default_state_capacity() -> usize {
    1024
}

fn build_sources() -> Result<config::Config, config::ConfigError> {
    use config::{Config, Environment, File};
    Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()
}

/// Load application configuration from an optional `config.yaml` + environment overrides.
///
/// Environment variables override file values without a prefix, nested keys are
/// separated by double underscores (e.g. `BOOTSTRAP__TIMEOUT_SECS`). Top-level keys
/// map directly, so `HYDRA_ADMIN_URL` sets `hydra_admin_url`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let app: AppConfig = build_sources()?.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Table holding the demo client settings, next to the provider's top-level keys.
pub const DEMO_CLIENT_KEY: &str = "demo_client";

/// Reads and validates the `demo_client` table of `config`.
pub fn demo_client_config_from(config: &config::Config) -> Result<DemoClientConfig, ConfigError> {
    let demo: DemoClientConfig = config.get(DEMO_CLIENT_KEY)?;
    demo.validate()?;
    Ok(demo)
}

/// Same sources as [`load_config`], reading the `demo_client` table.
///
/// Environment overrides use the same prefix, e.g. `DEMO_CLIENT__LISTEN_ADDR`.
pub fn load_demo_client_config() -> Result<DemoClientConfig, ConfigError> {
    demo_client_config_from(&build_sources()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            hydra_admin_url: "http://hydra:4445".into(),
            hydra_public_url: "http://hydra:4444".into(),
            issuer_uri: String::new(),
            alternative_redirect_hydra_url: String::new(),
            skip_tls_verify: false,
            listen_addr: default_listen_addr(),
            base_path: default_base_path(),
            static_dir: default_static_dir(),
            clients_file: default_clients_file(),
            users_file: default_users_file(),
            bootstrap: BootstrapConfig::default(),
        }
    }

    #[test]
    fn accepts_valid_urls() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_relative_admin_url() {
        let mut cfg = base_config();
        cfg.hydra_admin_url = "hydra:4445/admin".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut cfg = base_config();
        cfg.hydra_public_url = "ftp://hydra:4444".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut cfg = base_config();
        cfg.bootstrap.max_attempts = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn base_path_normalization() {
        let mut cfg = base_config();
        cfg.base_path = "/idp/".into();
        assert_eq!(cfg.normalized_base_path(), "/idp");
        cfg.base_path = "/".into();
        assert_eq!(cfg.normalized_base_path(), "");
    }

    #[test]
    fn bootstrap_defaults_match_polling_contract() {
        let b = BootstrapConfig::default();
        assert_eq!(b.timeout(), Duration::from_secs(60));
        assert_eq!(b.interval(), Duration::from_secs(1));
        assert_eq!(b.max_attempts, 100);
    }
}
