//! Configuration loading and management
//!
//! Two documents are read from YAML:
//!
//! - [`AppConfig`]: server, logging, storage and pagination settings
//! - [`RelationsConfig`]: navigation routes between tables

pub mod logging;

use crate::core::error::ConfigError;
use crate::core::query::PaginationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relations shipped with the service
pub const DEFAULT_RELATIONS: &str = include_str!("../../config/relations.yaml");

/// Environment variable overriding `storage.url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

// =============================================================================
// Application configuration
// =============================================================================

/// Complete service configuration; every section is optional in YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
    /// Name reported by the health endpoints
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors: false,
            service_name: "restaurant-ops".to_string(),
        }
    }
}

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,restaurant=debug,tower_http=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Connection string for relational backends
    pub url: Option<String>,
    pub max_connections: u32,
    /// YAML dataset loaded at startup
    pub seed: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            url: None,
            max_connections: 5,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Apply `DATABASE_URL` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.storage.url = Some(url);
            }
        }
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_limit".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_limit".to_string(),
                value: self.pagination.default_limit.to_string(),
                message: format!("must be between 1 and {}", self.pagination.max_limit),
            });
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.url.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "storage.url".to_string(),
                value: String::new(),
                message: format!("required for the postgres backend (or set {})", DATABASE_URL_ENV),
            });
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_connections".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// Relations configuration
// =============================================================================

/// How two tables are related
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationVia {
    /// Rows of `table` pair a source id (`source_field`) with a target id (`target_field`)
    LinkTable {
        table: String,
        source_field: String,
        target_field: String,
    },
    /// The target table holds `field`, pointing at the source table
    ForeignKey { field: String },
}

/// A navigable relation between a source and a target table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    pub name: String,

    pub source: String,

    pub target: String,

    /// Route name when navigating from source to target
    ///
    /// Example: "dishes" → /menus/{id}/dishes
    pub forward_route_name: String,

    /// Route name when navigating from target to source
    ///
    /// Example: "menus" → /dishes/{id}/menus
    pub reverse_route_name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub via: RelationVia,
}

/// Every relation served by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationsConfig {
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

impl RelationsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Relations shipped with the service
    pub fn default_config() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_RELATIONS)
    }

    /// Merge several configurations; later relations with the same name win
    pub fn merge(configs: Vec<RelationsConfig>) -> Self {
        let mut merged: Vec<RelationDefinition> = Vec::new();
        for relation in configs.into_iter().flat_map(|c| c.relations) {
            merged.retain(|r| r.name != relation.name);
            merged.push(relation);
        }
        Self { relations: merged }
    }
}
