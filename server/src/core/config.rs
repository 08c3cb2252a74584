use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::sql::Backend;
use crate::domain::filters::{
    CompileOptions, DateFallback, GroupCombinator, JsonValueCombinator, OrGroupErrors,
};
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT};

// =============================================================================
// File Configuration (JSON)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Filter compilation section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FiltersFileConfig {
    pub or_group_errors: Option<OrGroupErrors>,
    pub or_groups: Option<GroupCombinator>,
    pub json_values: Option<JsonValueCombinator>,
    pub date_fallback: Option<DateFallback>,
}

/// SQL rendering section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SqlFileConfig {
    pub dialect: Option<Backend>,
}

/// Record catalog section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileConfig {
    pub seed_path: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub filters: Option<FiltersFileConfig>,
    pub sql: Option<SqlFileConfig>,
    pub catalog: Option<CatalogFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Unknown top-level fields, sorted
    fn unknown_fields(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(filters) = other.filters {
            let current = self.filters.get_or_insert_with(FiltersFileConfig::default);
            if filters.or_group_errors.is_some() {
                current.or_group_errors = filters.or_group_errors;
            }
            if filters.or_groups.is_some() {
                current.or_groups = filters.or_groups;
            }
            if filters.json_values.is_some() {
                current.json_values = filters.json_values;
            }
            if filters.date_fallback.is_some() {
                current.date_fallback = filters.date_fallback;
            }
        }

        if let Some(sql) = other.sql
            && sql.dialect.is_some()
        {
            tracing::trace!(dialect = ?sql.dialect, "Merging sql.dialect");
            self.sql.get_or_insert_with(SqlFileConfig::default).dialect = sql.dialect;
        }

        if let Some(catalog) = other.catalog
            && catalog.seed_path.is_some()
        {
            self.catalog
                .get_or_insert_with(CatalogFileConfig::default)
                .seed_path = catalog.seed_path;
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlConfig {
    pub dialect: Backend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Product seed replacing the built-in records
    pub seed_path: Option<PathBuf>,
}

/// Final merged application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub filters: CompileOptions,
    pub sql: SqlConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.sieve/sieve.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            dialect = %config.sql.dialect,
            filters = %config.filters,
            "Configuration resolved"
        );
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_filters = file_config.filters.unwrap_or_default();
        let file_sql = file_config.sql.unwrap_or_default();
        let file_catalog = file_config.catalog.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        if is_all_interfaces(&host) {
            tracing::debug!(host = %host, "Binding to all network interfaces");
        }

        let defaults = CompileOptions::default();
        let filters = CompileOptions {
            or_group_errors: cli
                .or_group_errors
                .or(file_filters.or_group_errors)
                .unwrap_or(defaults.or_group_errors),
            or_groups: file_filters.or_groups.unwrap_or(defaults.or_groups),
            json_values: file_filters.json_values.unwrap_or(defaults.json_values),
            date_fallback: file_filters.date_fallback.unwrap_or(defaults.date_fallback),
        };

        let dialect = cli.dialect.or(file_sql.dialect).unwrap_or_default();

        let seed_path = cli
            .seed_path
            .clone()
            .or_else(|| file_catalog.seed_path.map(PathBuf::from))
            .map(|p| expand_path(&p.to_string_lossy()));

        Self {
            server: ServerConfig { host, port },
            filters,
            sql: SqlConfig { dialect },
            catalog: CatalogConfig { seed_path },
        }
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
