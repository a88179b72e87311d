//! Configuration management.

pub mod validation;

pub use validation::{Validate, ValidationError};

use std::path::Path;

use serde::{Deserialize, Serialize};

const DEFAULT_JSON_REPORT_FILE_PATH: &str = "findings.json";

/// Document store connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub collection: String,
}

/// Scan environment scoping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Cluster to scan; 0 means all clusters.
    pub cluster_id: i64,
    pub tenant_id: i64,
}

/// Report output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExporterConfig {
    pub json_report_file_path: String,
}

/// Optional filter-criteria source: named criteria sets stored in a
/// document-store collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiCollectionsConfig {
    pub collection_template: String,
    pub name_list: Vec<String>,
}

/// Application configuration, loaded from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    pub database: DatabaseConfig,
    pub environment: EnvironmentConfig,
    /// Path or URL of the primary OpenAPI v3 document.
    #[serde(rename = "openAPISpec")]
    pub open_api_spec: String,
    /// Additional spec documents to reconcile against.
    pub api_spec_files: Vec<String>,
    /// Optional allowlist of exact request paths.
    pub endpoints: Vec<String>,
    pub api_collections: ApiCollectionsConfig,
    pub exporter: ExporterConfig,
    pub scan_name: String,
}

impl Configuration {
    /// Load and validate the configuration from `path`.
    ///
    /// Missing report path and scan name are filled with defaults before
    /// validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: Configuration =
            serde_yml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        if config.exporter.json_report_file_path.is_empty() {
            config.exporter.json_report_file_path = DEFAULT_JSON_REPORT_FILE_PATH.to_string();
            tracing::warn!(
                path = DEFAULT_JSON_REPORT_FILE_PATH,
                "using default JSON report file path"
            );
        }

        if config.scan_name.is_empty() {
            config.scan_name = generated_scan_name();
            tracing::info!(
                scan_name = %config.scan_name,
                "scanName not provided, using generated name"
            );
        }

        config.validate()?;
        config.log_redacted();

        Ok(config)
    }

    /// Log the effective configuration at debug level with credentials
    /// blanked out.
    fn log_redacted(&self) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }

        let mut redacted = self.clone();
        redacted.database.user = String::new();
        redacted.database.password = String::new();

        match serde_json::to_string(&redacted) {
            Ok(json) => tracing::debug!(configuration = %json, "loaded configuration"),
            Err(e) => tracing::error!(error = %e, "failed to serialize configuration"),
        }
    }
}

fn generated_scan_name() -> String {
    format!(
        "openapi-scan-{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    )
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
database:
  uri: "mongodb://localhost:27017"
  user: "u"
  password: "p"
  name: "telemetry"
  collection: "api_events"
environment:
  clusterId: 3
  tenantId: 7
openAPISpec: "openapi.yaml"
"#;

    #[test]
    fn loads_minimal_config_with_defaults() {
        let file = write_config(MINIMAL);
        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.database.name, "telemetry");
        assert_eq!(config.environment.cluster_id, 3);
        assert_eq!(config.environment.tenant_id, 7);
        assert_eq!(config.open_api_spec, "openapi.yaml");
        assert_eq!(config.exporter.json_report_file_path, "findings.json");
        assert!(config.scan_name.starts_with("openapi-scan-"));
    }

    #[test]
    fn rejects_missing_database_fields() {
        let file = write_config(
            r#"
database:
  uri: "mongodb://localhost:27017"
openAPISpec: "openapi.yaml"
"#,
        );
        let err = Configuration::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_missing_spec() {
        let without_spec = MINIMAL.replace("openAPISpec: \"openapi.yaml\"", "");
        let file = write_config(&without_spec);
        let err = Configuration::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn keeps_explicit_scan_name_and_report_path() {
        let mut content = MINIMAL.to_string();
        content.push_str("scanName: \"nightly\"\nexporter:\n  jsonReportFilePath: \"out.json\"\n");
        let file = write_config(&content);
        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.scan_name, "nightly");
        assert_eq!(config.exporter.json_report_file_path, "out.json");
    }

    #[test]
    fn parses_optional_sections() {
        let mut content = MINIMAL.to_string();
        content.push_str(
            r#"
apiSpecFiles:
  - "extra.yaml"
endpoints:
  - "/api/v1/users"
apiCollections:
  collectionTemplate: "api_collections"
  nameList:
    - "external"
"#,
        );
        let file = write_config(&content);
        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.api_spec_files, vec!["extra.yaml"]);
        assert_eq!(config.endpoints, vec!["/api/v1/users"]);
        assert_eq!(config.api_collections.collection_template, "api_collections");
        assert_eq!(config.api_collections.name_list, vec!["external"]);
    }
}
