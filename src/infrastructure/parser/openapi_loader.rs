//! OpenAPI v3 loader: fetches spec bytes from disk or HTTP and parses them
//! into the domain spec model.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::domain::value_objects::{SpecModel, SpecOperation, SpecPath};

/// Load and parse one spec document from a file path or URL.
pub async fn load_model(location: &str) -> Result<SpecModel, ParseError> {
    let bytes = fetch_spec_bytes(location).await?;
    if bytes.is_empty() {
        return Err(ParseError::Empty {
            location: location.to_string(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|_| ParseError::Encoding {
        location: location.to_string(),
    })?;

    parse_model(&content, location)
}

/// Load several spec documents, logging and skipping individual failures.
///
/// The result may be empty; callers decide whether that aborts the run.
pub async fn load_many(locations: &[String]) -> BTreeMap<String, SpecModel> {
    let mut models = BTreeMap::new();
    for location in locations {
        if location.is_empty() {
            continue;
        }
        match load_model(location).await {
            Ok(model) => {
                models.insert(location.clone(), model);
            }
            Err(e) => warn!(spec = %location, error = %e, "failed to load spec, skipping"),
        }
    }
    models
}

/// Parse spec content into the domain model.
///
/// Content starting with `{` is treated as JSON, anything else as YAML. The
/// first parse error is surfaced; versions other than 3.x are rejected.
pub fn parse_model(content: &str, location: &str) -> Result<SpecModel, ParseError> {
    info!(spec = %location, "parsing OpenAPI specification");

    let spec = if content.trim_start().starts_with('{') {
        oas3::from_json(content).map_err(|e| ParseError::Parse {
            location: location.to_string(),
            message: format!("JSON parse error: {e}"),
        })?
    } else {
        oas3::from_yaml(content).map_err(|e| ParseError::Parse {
            location: location.to_string(),
            message: format!("YAML parse error: {e}"),
        })?
    };

    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::InvalidVersion {
            location: location.to_string(),
            version: spec.openapi,
        });
    }

    Ok(convert_spec(spec, location))
}

fn convert_spec(spec: oas3::Spec, location: &str) -> SpecModel {
    let mut paths = Vec::new();
    if let Some(spec_paths) = &spec.paths {
        for (template, item) in spec_paths {
            paths.push(SpecPath {
                template: template.clone(),
                operations: operations(item),
            });
        }
    }

    SpecModel {
        source: location.to_string(),
        title: spec.info.title.clone(),
        paths,
    }
}

fn operations(item: &oas3::spec::PathItem) -> Vec<SpecOperation> {
    let candidates: [(&str, &Option<oas3::spec::Operation>); 8] = [
        ("get", &item.get),
        ("put", &item.put),
        ("post", &item.post),
        ("delete", &item.delete),
        ("options", &item.options),
        ("head", &item.head),
        ("patch", &item.patch),
        ("trace", &item.trace),
    ];

    candidates
        .into_iter()
        .filter_map(|(method, operation)| {
            operation.as_ref().map(|op| SpecOperation {
                method: method.to_string(),
                deprecated: op.deprecated,
            })
        })
        .collect()
}

async fn fetch_spec_bytes(location: &str) -> Result<Vec<u8>, ParseError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let response = reqwest::get(location)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| ParseError::Fetch {
                location: location.to_string(),
                source,
            })?;
        let body = response.bytes().await.map_err(|source| ParseError::Fetch {
            location: location.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    } else {
        tokio::fs::read(location)
            .await
            .map_err(|source| ParseError::Io {
                location: location.to_string(),
                source,
            })
    }
}

/// Spec loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read spec file {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("failed to fetch spec from {location}: {source}")]
    Fetch {
        location: String,
        source: reqwest::Error,
    },

    #[error("spec at '{location}' is empty")]
    Empty { location: String },

    #[error("spec at '{location}' is not valid UTF-8")]
    Encoding { location: String },

    #[error("failed to parse spec {location}: {message}")]
    Parse { location: String, message: String },

    #[error("unsupported OpenAPI version {version} in {location} (3.x required)")]
    InvalidVersion { location: String, version: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
paths:
  /users:
    get:
      responses:
        '200':
          description: Success
    post:
      deprecated: true
      responses:
        '201':
          description: Created
  /users/{id}:
    get:
      responses:
        '200':
          description: Success
"#;

    #[test]
    fn parses_yaml_spec_into_domain_model() {
        let model = parse_model(SAMPLE_YAML, "test.yaml").unwrap();
        assert_eq!(model.source, "test.yaml");
        assert_eq!(model.title, "Test API");
        assert_eq!(model.paths.len(), 2);

        let users = &model.paths[0];
        assert_eq!(users.template, "/users");
        assert_eq!(users.operations.len(), 2);
        assert_eq!(users.operations[0].method, "get");
        assert!(!users.operations[0].is_deprecated());
        assert_eq!(users.operations[1].method, "post");
        assert!(users.operations[1].is_deprecated());

        assert_eq!(model.paths[1].template, "/users/{id}");
    }

    #[test]
    fn parses_json_spec() {
        let json = r#"{
  "openapi": "3.0.0",
  "info": { "title": "JSON API", "version": "1.0.0" },
  "paths": { "/ping": { "get": { "responses": { "200": { "description": "ok" } } } } }
}"#;
        let model = parse_model(json, "test.json").unwrap();
        assert_eq!(model.title, "JSON API");
        assert_eq!(model.paths[0].template, "/ping");
    }

    #[test]
    fn rejects_unsupported_version() {
        let swagger = "openapi: 2.0.0\ninfo:\n  title: Old\n  version: '1'\npaths: {}\n";
        let err = parse_model(swagger, "old.yaml").unwrap_err();
        assert!(matches!(err, ParseError::InvalidVersion { .. }));
    }

    #[test]
    fn surfaces_parse_errors() {
        let err = parse_model("{not json", "bad.json").unwrap_err();
        assert!(matches!(err, ParseError::Parse { .. }));
    }
}
