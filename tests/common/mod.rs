//! Shared fixtures for integration tests.

use std::collections::{BTreeMap, HashSet};

use specwatch::domain::entities::ApiEvent;
use specwatch::domain::value_objects::SpecModel;
use specwatch::infrastructure::parser::parse_model;

/// An observed event against the `orders.svc` service in the `prod` cluster.
pub fn event(method: &str, path: &str, occurrences: i64) -> ApiEvent {
    ApiEvent {
        cluster_name: "prod".to_string(),
        service_name: "orders.svc".to_string(),
        request_method: method.to_string(),
        request_path: path.to_string(),
        response_code: 200,
        occurrences,
        port: 8080,
        request: None,
        response: None,
    }
}

pub fn event_set(events: Vec<ApiEvent>) -> HashSet<ApiEvent> {
    events.into_iter().collect()
}

/// Parse `(file name, YAML)` pairs into a model map.
pub fn spec_models(specs: &[(&str, &str)]) -> BTreeMap<String, SpecModel> {
    specs
        .iter()
        .map(|(name, yaml)| ((*name).to_string(), parse_model(yaml, name).unwrap()))
        .collect()
}

pub const USERS_SPEC: &str = r#"openapi: 3.0.3
info:
  title: Users API
  version: 1.0.0
paths:
  /users/{id}:
    get:
      responses:
        '200':
          description: A user
"#;

pub const ORDERS_SPEC: &str = r#"openapi: 3.0.3
info:
  title: Orders API
  version: 1.0.0
paths:
  /orders/{id}:
    get:
      responses:
        '200':
          description: An order
"#;

/// A literal segment (`2024`) sharing a trie level with a `{…}` sibling.
pub const SIBLING_SPEC: &str = r#"openapi: 3.0.3
info:
  title: Orders Reporting API
  version: 1.0.0
paths:
  /orders/2024:
    get:
      responses:
        '200':
          description: The 2024 order archive
  /orders/{id}/status:
    get:
      responses:
        '200':
          description: Order status
"#;

pub const LEGACY_SPEC: &str = r#"openapi: 3.0.3
info:
  title: Legacy API
  version: 1.0.0
paths:
  /legacy:
    delete:
      deprecated: true
      responses:
        '204':
          description: Removed
"#;

pub const HEALTH_SPEC: &str = r#"openapi: 3.0.3
info:
  title: Health API
  version: 1.0.0
paths:
  /health:
    get:
      responses:
        '200':
          description: Healthy
"#;
