//! Spec-model and filter-criteria value objects.

use serde::{Deserialize, Serialize};

/// A parsed OpenAPI v3 document, reduced to the subset the reconciliation
/// consumes.
#[derive(Debug, Clone)]
pub struct SpecModel {
    /// File path or URL the model was loaded from.
    pub source: String,
    /// `info.title`, empty if absent.
    pub title: String,
    pub paths: Vec<SpecPath>,
}

/// A declared path template and its operations.
#[derive(Debug, Clone)]
pub struct SpecPath {
    pub template: String,
    pub operations: Vec<SpecOperation>,
}

impl SpecPath {
    /// Whether any operation matches `method`, case-insensitively.
    pub fn has_method(&self, method: &str) -> bool {
        self.operations
            .iter()
            .any(|op| op.method.eq_ignore_ascii_case(method))
    }
}

/// A declared operation. Methods use the spec's lowercase convention.
#[derive(Debug, Clone)]
pub struct SpecOperation {
    pub method: String,
    /// Tri-state: unset / false / true.
    pub deprecated: Option<bool>,
}

impl SpecOperation {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }
}

/// A filter predicate narrowing the event store query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// `AND` | `OR`; ignored on the first element.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub operator: String,
    pub condition: Condition,
}

/// A filter condition: a logical field name plus its comparison values.
///
/// The field names form a closed enumeration; unknown names are rejected when
/// the criteria are compiled, not when they are decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field: String,
    pub value: StringOperators,
}

/// String comparison filters. At most one list may be non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StringOperators {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub eq: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub neq: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regex: Vec<String>,
}
