//! Configuration file handling.
//!
//! Settings are read from `dashboard.toml` (or the path given with
//! `--config`). Every field has a default, so a partial file is enough.

use crate::dataset::{Record, EXPORT_FILE_NAME};
use crate::error::{DashboardError, Result};
use crate::pages::{PageContext, ROWS_DEFAULT, SIDEBAR_TITLE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub data_view: DataViewConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Sidebar heading.
    #[serde(default = "default_title")]
    pub title: String,

    /// Log level used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            log_level: default_log_level(),
        }
    }
}

fn default_title() -> String {
    SIDEBAR_TITLE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// CSV download settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name offered for the download.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

fn default_file_name() -> String {
    EXPORT_FILE_NAME.to_string()
}

/// Data View page settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataViewConfig {
    /// Rows shown before the slider is touched.
    #[serde(default = "default_rows")]
    pub default_rows: usize,
}

impl Default for DataViewConfig {
    fn default() -> Self {
        Self {
            default_rows: default_rows(),
        }
    }
}

fn default_rows() -> usize {
    ROWS_DEFAULT
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            DashboardError::Config(format!("invalid TOML in {}: {}", path.display(), e))
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Load `path` if given, else `dashboard.toml` if present, else defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    debug!("Loading config from {}", DEFAULT_CONFIG_FILE);
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Write configuration as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Session start context with configured defaults applied
    pub fn page_context(&self, records: &[Record]) -> PageContext {
        PageContext {
            rows_to_show: self.data_view.default_rows,
            export_file_name: self.export.file_name.clone(),
            ..PageContext::for_records(records)
        }
    }

    /// Commented default file for `init-config`.
    pub fn default_toml() -> String {
        format!(
            r#"# Job market dashboard configuration

[general]
# Sidebar heading
title = "{title}"
# Log level when RUST_LOG is unset: error, warn, info, debug, trace
log_level = "info"

[server]
# Listen address of dashboard-server
bind = "0.0.0.0:3000"

[export]
# File name offered for the CSV download
file_name = "{file_name}"

[data_view]
# Rows shown on the Data View page before the slider moves
default_rows = {rows}
"#,
            title = SIDEBAR_TITLE,
            file_name = EXPORT_FILE_NAME,
            rows = ROWS_DEFAULT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.title, "China Jobs Market");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.export.file_name, "job_market_data.csv");
        assert_eq!(config.data_view.default_rows, 20);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
[server]
bind = "127.0.0.1:8080"
"#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.export.file_name, "job_market_data.csv");
    }

    #[test]
    fn test_load_from_toml() {
        let toml_content = r#"
[general]
title = "Jobs"
log_level = "debug"

[export]
file_name = "jobs.csv"

[data_view]
default_rows = 10
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.general.title, "Jobs");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.export.file_name, "jobs.csv");
        assert_eq!(config.data_view.default_rows, 10);
    }

    #[test]
    fn test_default_toml_parses_to_defaults() {
        let config = Config::from_toml(&Config::default_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_config() {
        let config = Config::default();
        let file = NamedTempFile::new().unwrap();
        config.save(file.path()).unwrap();
        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("[server]\nbind = 3000").unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn test_page_context_uses_configured_defaults() {
        let mut config = Config::default();
        config.export.file_name = "jobs.csv".to_string();
        config.data_view.default_rows = 10;

        let ctx = config.page_context(&crate::dataset::sample_records());
        assert_eq!(ctx.rows_to_show, 10);
        assert_eq!(ctx.export_file_name, "jobs.csv");
        assert_eq!(ctx.thresholds.min_salary, 9000.0);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_or_default(Some(Path::new("/nonexistent/dashboard.toml"))).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
