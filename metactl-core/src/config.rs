//! Project configuration.
//!
//! # Storage layout
//!
//! ```text
//! <project>/
//!   config.yaml            (optional: endpoint, admin_secret, migrations_directory)
//!   migrations/            (default migrations directory)
//!     metadata.yaml | metadata.json
//! ```
//!
//! Values are resolved once per command into an [`ExecutionConfig`] that is
//! passed explicitly to whatever needs it. Precedence, highest first:
//! command-line flag or environment variable, `config.yaml`, built-in default.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Path of the remote engine's query API, relative to the endpoint.
const QUERY_PATH: &str = "v1/query";

// ---------------------------------------------------------------------------
// config.yaml
// ---------------------------------------------------------------------------

/// Contents of `<project>/config.yaml`. Every key is optional.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrations_directory: Option<PathBuf>,
}

impl ProjectConfig {
    /// `<project_dir>/config.yaml`: pure, no I/O.
    pub fn path_at(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE_NAME)
    }

    /// Load `<project_dir>/config.yaml`, or defaults if the file is absent.
    pub fn load_at(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_at(project_dir);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("no {} in {}", CONFIG_FILE_NAME, project_dir.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }
}

impl fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("endpoint", &self.endpoint)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<redacted>"))
            .field("migrations_directory", &self.migrations_directory)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Server connection
// ---------------------------------------------------------------------------

/// Connection parameters for the remote engine.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    endpoint: String,
    admin_secret: Option<String>,
}

impl ServerConfig {
    /// Validate `endpoint` (http/https) and strip trailing slashes.
    pub fn new(endpoint: &str, admin_secret: Option<String>) -> Result<Self, ConfigError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
        let has_host = trimmed
            .split_once("://")
            .map(|(_, rest)| !rest.is_empty())
            .unwrap_or(false);
        if !has_scheme || !has_host {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            });
        }
        Ok(Self {
            endpoint: trimmed.to_string(),
            admin_secret: admin_secret.filter(|s| !s.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn admin_secret(&self) -> Option<&str> {
        self.admin_secret.as_deref()
    }

    /// `<endpoint>/v1/query`
    pub fn query_url(&self) -> String {
        format!("{}/{QUERY_PATH}", self.endpoint)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("endpoint", &self.endpoint)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Resolved execution config
// ---------------------------------------------------------------------------

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub endpoint: Option<String>,
    pub admin_secret: Option<String>,
}

/// Everything one command invocation needs, resolved up front.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub project_dir: PathBuf,
    pub migrations_dir: PathBuf,
    pub server: ServerConfig,
}

impl ExecutionConfig {
    /// Merge overrides, `<project_dir>/config.yaml` and defaults.
    pub fn resolve(project_dir: &Path, overrides: ServerOverrides) -> Result<Self, ConfigError> {
        let file = ProjectConfig::load_at(project_dir)?;

        let endpoint = overrides
            .endpoint
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let admin_secret = overrides.admin_secret.or(file.admin_secret);
        let server = ServerConfig::new(&endpoint, admin_secret)?;

        let migrations = file
            .migrations_directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR));
        let migrations_dir = if migrations.is_absolute() {
            migrations
        } else {
            project_dir.join(migrations)
        };

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            migrations_dir,
            server,
        })
    }
}
