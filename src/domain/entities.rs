//! Reconciliation domain entities.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One observed HTTP exchange, decoded from the event store.
///
/// Set membership covers the scalar fields only; the opaque `request` and
/// `response` payloads are carried along for reporting but never compared.
#[derive(Debug, Clone, Default)]
pub struct ApiEvent {
    pub cluster_name: String,
    /// Derived from the `:authority` header, falling back to `host`.
    pub service_name: String,
    /// Case preserved at ingest; compared case-insensitively.
    pub request_method: String,
    /// May still include a query string.
    pub request_path: String,
    pub response_code: i64,
    /// Aggregated count for identical tuples.
    pub occurrences: i64,
    /// 0 = unknown.
    pub port: i64,
    pub request: Option<Value>,
    pub response: Option<Value>,
}

impl PartialEq for ApiEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cluster_name == other.cluster_name
            && self.service_name == other.service_name
            && self.request_method == other.request_method
            && self.request_path == other.request_path
            && self.response_code == other.response_code
            && self.occurrences == other.occurrences
            && self.port == other.port
    }
}

impl Eq for ApiEvent {}

impl Hash for ApiEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cluster_name.hash(state);
        self.service_name.hash(state);
        self.request_method.hash(state);
        self.request_path.hash(state);
        self.response_code.hash(state);
        self.occurrences.hash(state);
        self.port.hash(state);
    }
}

/// Finding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingType {
    Shadow,
    Zombie,
    Orphan,
    Active,
}

impl FindingType {
    /// Severity is fixed by finding type.
    pub fn severity(self) -> FindingSeverity {
        match self {
            FindingType::Shadow => FindingSeverity::Critical,
            FindingType::Zombie => FindingSeverity::High,
            FindingType::Orphan => FindingSeverity::Low,
            FindingType::Active => FindingSeverity::Info,
        }
    }
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Critical,
    High,
    Low,
    Info,
}

/// A spec document participating in the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSpecFile {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub title: String,
}

/// One classified endpoint in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFinding {
    #[serde(
        rename = "clusterName",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub cluster_name: String,
    #[serde(
        rename = "serviceName",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub service_name: String,
    #[serde(rename = "requestMethod")]
    pub request_method: String,
    #[serde(rename = "requestPath")]
    pub request_path: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub occurrences: i64,
    pub severity: FindingSeverity,
    #[serde(rename = "status_code", default, skip_serializing_if = "is_zero")]
    pub status_code: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub port: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(
        rename = "associatedApiSpecFiles",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub associated_api_spec_files: Vec<ApiSpecFile>,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
}

impl ApiFinding {
    /// Build a finding of `finding_type` out of an observed event, using the
    /// already-normalized request path.
    pub fn from_event(event: &ApiEvent, normalized_path: &str, finding_type: FindingType) -> Self {
        Self {
            cluster_name: event.cluster_name.clone(),
            service_name: event.service_name.clone(),
            request_method: event.request_method.clone(),
            request_path: normalized_path.to_string(),
            occurrences: event.occurrences,
            severity: finding_type.severity(),
            status_code: event.response_code,
            port: event.port,
            request: event.request.clone(),
            response: event.response.clone(),
            associated_api_spec_files: Vec::new(),
            finding_type,
        }
    }

    /// Build an orphan finding for a declared-but-untrafficked operation.
    pub fn orphan(method_upper: &str, template: &str) -> Self {
        Self {
            cluster_name: String::new(),
            service_name: String::new(),
            request_method: method_upper.to_string(),
            request_path: template.to_string(),
            occurrences: 0,
            severity: FindingType::Orphan.severity(),
            status_code: 0,
            port: 0,
            request: None,
            response: None,
            associated_api_spec_files: Vec::new(),
            finding_type: FindingType::Orphan,
        }
    }
}

/// The reconciliation report as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiReport {
    #[serde(rename = "tenantId")]
    pub tenant_id: i64,
    #[serde(rename = "scan_name")]
    pub scan_name: String,
    #[serde(
        rename = "scanTimestamp",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub scan_timestamp: String,
    #[serde(
        rename = "scopedApiSpecFiles",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub scoped_api_spec_files: Vec<ApiSpecFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,
    #[serde(rename = "shadowApis", default, skip_serializing_if = "Vec::is_empty")]
    pub shadow_apis: Vec<ApiFinding>,
    #[serde(rename = "zombieApis", default, skip_serializing_if = "Vec::is_empty")]
    pub zombie_apis: Vec<ApiFinding>,
    #[serde(rename = "orphanApis", default, skip_serializing_if = "Vec::is_empty")]
    pub orphan_apis: Vec<ApiFinding>,
    #[serde(rename = "activeApis", default, skip_serializing_if = "Vec::is_empty")]
    pub active_apis: Vec<ApiFinding>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn event_set_membership_ignores_opaque_payloads() {
        let mut a = ApiEvent {
            request_method: "GET".to_string(),
            request_path: "/users/1".to_string(),
            response_code: 200,
            ..ApiEvent::default()
        };
        let mut b = a.clone();
        a.request = Some(serde_json::json!({"headers": {"host": "a"}}));
        b.request = Some(serde_json::json!({"headers": {"host": "b"}}));

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn severity_is_fixed_by_type() {
        assert_eq!(FindingType::Shadow.severity(), FindingSeverity::Critical);
        assert_eq!(FindingType::Zombie.severity(), FindingSeverity::High);
        assert_eq!(FindingType::Orphan.severity(), FindingSeverity::Low);
        assert_eq!(FindingType::Active.severity(), FindingSeverity::Info);
    }

    #[test]
    fn finding_serializes_with_expected_keys_and_omissions() {
        let finding = ApiFinding::orphan("GET", "/health");
        let json = serde_json::to_value(&finding).unwrap();

        assert_eq!(json["requestMethod"], "GET");
        assert_eq!(json["requestPath"], "/health");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["type"], "orphan");
        // Zero and empty fields are omitted.
        assert!(json.get("clusterName").is_none());
        assert!(json.get("occurrences").is_none());
        assert!(json.get("status_code").is_none());
        assert!(json.get("port").is_none());
    }
}
