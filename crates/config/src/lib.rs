//! Layered configuration for the Box filesystem adapter.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults.
//! 2. A YAML, TOML or JSON file (format chosen by extension, TOML otherwise).
//! 3. Environment variables prefixed with `BOXFS_`, nested with `__`
//!    (`BOXFS_AUTH__DEVELOPER_TOKEN`, `BOXFS_API__PAGE_SIZE`, ...).
//!
//! ```
//! use boxfs_config::Config;
//! use figment::Figment;
//! use figment::providers::{Format, Toml};
//!
//! let figment = Figment::new().merge(Toml::string(
//!     r#"
//!     repository = "backups/photos"
//!     [auth]
//!     developer_token = "abc123"
//!     "#,
//! ));
//! let config = Config::from_figment(&figment).unwrap();
//! assert_eq!(config.repository, "backups/photos");
//! assert!(config.auth.app_auth.is_none());
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BOXFS_";
/// Largest page size the Box API accepts for folder listings.
pub const MAX_PAGE_SIZE: u32 = 1000;
const CONFIG_FILE_NAME: &str = "config.toml";

/// How `mkdir` treats a folder that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MkdirConflict {
    /// Creating an existing folder succeeds silently.
    #[default]
    Ignore,
    /// Creating an existing folder is a write error.
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote folder (relative to the account root) that acts as `/`.
    pub repository: String,
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub mkdir_conflict: MkdirConflict,
}

/// Credentials. Setting `app_auth` selects enterprise authentication,
/// otherwise `developer_token` is used as-is.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub developer_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub app_auth: Option<AppAuthConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppAuthConfig {
    pub enterprise_id: String,
}

/// Overrides for the remote endpoints. Unset values keep the client defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_url: Option<String>,
    pub upload_url: Option<String>,
    pub token_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<u32>,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthConfig")
            .field("developer_token", &redact(&self.developer_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("app_auth", &self.app_auth)
            .finish()
    }
}

/// Default location of the configuration file, e.g.
/// `~/.config/boxfs/config.toml` on Linux.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "boxfs").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Build the provider stack without extracting anything.
pub fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::new();
    if let Some(path) = path {
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load and validate configuration.
///
/// An explicit `path` must exist. Without one, the [default
/// path](default_path) is used when present and skipped otherwise.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
        Some(path) => Some(path.to_path_buf()),
        None => default_path().filter(|path| path.is_file()),
    };
    match &path {
        Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
        None => tracing::debug!("No configuration file, using environment only"),
    }
    Config::from_figment(&figment(path.as_deref()))
}

impl Config {
    /// Extract and validate from an arbitrary provider stack.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load("cannot extract configuration".to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Enterprise authentication is configured.
    pub fn uses_app_auth(&self) -> bool {
        self.auth.app_auth.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        let segments: Vec<&str> = self.repository.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        if segments.is_empty() {
            exn::bail!(ErrorKind::Invalid("repository must name a folder below the account root".to_string()));
        }
        if segments.contains(&"..") {
            exn::bail!(ErrorKind::Invalid(format!("repository must not contain '..': {}", self.repository)));
        }
        if let Some(app_auth) = &self.auth.app_auth {
            if app_auth.enterprise_id.is_empty() {
                exn::bail!(ErrorKind::Invalid("auth.app_auth.enterprise_id is empty".to_string()));
            }
            if is_blank(&self.auth.client_id) || is_blank(&self.auth.client_secret) {
                exn::bail!(ErrorKind::Invalid("enterprise auth needs auth.client_id and auth.client_secret".to_string()));
            }
        } else if is_blank(&self.auth.developer_token) {
            exn::bail!(ErrorKind::Invalid("auth.developer_token is required without auth.app_auth".to_string()));
        }
        if let Some(page_size) = self.api.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            exn::bail!(ErrorKind::Invalid(format!("api.page_size must be between 1 and {MAX_PAGE_SIZE}")));
        }
        if self.api.timeout_secs == Some(0) {
            exn::bail!(ErrorKind::Invalid("api.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
