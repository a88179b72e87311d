//! Configuration validation module.

use crate::config::{Configuration, DatabaseConfig};

/// Trait for validating configuration sections.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Database configuration error: {message}")]
    Database { message: String },

    #[error("Spec configuration error: {message}")]
    Spec { message: String },

    #[error("Exporter configuration error: {message}")]
    Exporter { message: String },
}

impl ValidationError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn spec(message: impl Into<String>) -> Self {
        Self::Spec {
            message: message.into(),
        }
    }

    pub fn exporter(message: impl Into<String>) -> Self {
        Self::Exporter {
            message: message.into(),
        }
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.uri.is_empty() {
            return Err(ValidationError::database("URI cannot be empty"));
        }
        if self.user.is_empty() {
            return Err(ValidationError::database("user cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::database("password cannot be empty"));
        }
        if self.name.is_empty() {
            return Err(ValidationError::database("database name cannot be empty"));
        }
        if self.collection.is_empty() {
            return Err(ValidationError::database(
                "collection name cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Validate for Configuration {
    fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;

        if self.open_api_spec.is_empty() {
            return Err(ValidationError::spec(
                "openAPISpec must name an OpenAPI specification file path or URL",
            ));
        }

        if self.exporter.json_report_file_path.is_empty() {
            return Err(ValidationError::exporter(
                "jsonReportFilePath cannot be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_database() -> DatabaseConfig {
        DatabaseConfig {
            uri: "mongodb://localhost:27017".to_string(),
            user: "u".to_string(),
            password: "p".to_string(),
            name: "telemetry".to_string(),
            collection: "api_events".to_string(),
        }
    }

    #[test]
    fn database_validation_requires_every_field() {
        assert!(valid_database().validate().is_ok());

        for blank in ["uri", "user", "password", "name", "collection"] {
            let mut db = valid_database();
            match blank {
                "uri" => db.uri.clear(),
                "user" => db.user.clear(),
                "password" => db.password.clear(),
                "name" => db.name.clear(),
                _ => db.collection.clear(),
            }
            assert!(db.validate().is_err(), "expected `{blank}` to be required");
        }
    }

    #[test]
    fn configuration_requires_spec_and_report_path() {
        let mut config = Configuration {
            database: valid_database(),
            open_api_spec: "openapi.yaml".to_string(),
            ..Configuration::default()
        };
        config.exporter.json_report_file_path = "findings.json".to_string();
        assert!(config.validate().is_ok());

        let mut no_spec = config.clone();
        no_spec.open_api_spec.clear();
        assert!(matches!(
            no_spec.validate(),
            Err(ValidationError::Spec { .. })
        ));

        let mut no_report = config;
        no_report.exporter.json_report_file_path.clear();
        assert!(matches!(
            no_report.validate(),
            Err(ValidationError::Exporter { .. })
        ));
    }
}
