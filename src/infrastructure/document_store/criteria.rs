//! Compiles user-supplied filter criteria into a document store filter.

use bson::{Bson, Document};

use crate::domain::value_objects::{FilterCriteria, StringOperators};

/// Map a logical field name to its document-store key path.
///
/// The field names form a closed enumeration; anything else is a fatal
/// criteria error.
fn bson_key(field: &str) -> Result<&'static str, CriteriaError> {
    Ok(match field {
        "api_type" => "api_event.metadata.api_type",
        "auth_type" => "api_event.metadata.is_authenticated",
        "hostname" => "api_event.http.request.hostname",
        "method" => "api_event.http.request.method",
        "path" => "api_event.http.request.path",
        "response_code" => "api_event.http.response.status_code",
        "access_type" => "api_event.metadata.access_type",
        "count" => "api_event.count",
        "destination_ip" => "destination",
        "destination_name" => "api_event.network.destination.metadata.name",
        "destination_type" => "api_event.network.destination.type",
        "risk_score" => "api_event.overall_risk_score",
        "severity" => "api_event.overall_severity",
        "sensitive_data_type" => "api_event.sensitive_data.name",
        other => return Err(CriteriaError::UnknownField(other.to_string())),
    })
}

/// At most one of eq/neq/regex may be populated. All-empty is valid and
/// contributes no predicate.
pub fn validate_string_operators(value: &StringOperators) -> bool {
    [&value.eq, &value.neq, &value.regex]
        .iter()
        .filter(|list| !list.is_empty())
        .count()
        <= 1
}

fn predicate(criteria: &FilterCriteria) -> Result<Document, CriteriaError> {
    let key = bson_key(&criteria.condition.field)?;
    let value = &criteria.condition.value;

    if !validate_string_operators(value) {
        return Err(CriteriaError::ConflictingOperators {
            field: criteria.condition.field.clone(),
        });
    }

    let mut filter = Document::new();
    if !value.eq.is_empty() {
        filter.insert(key, bson::doc! { "$in": value.eq.clone() });
    } else if !value.neq.is_empty() {
        filter.insert(key, bson::doc! { "$nin": value.neq.clone() });
    } else if !value.regex.is_empty() {
        filter.insert(
            key,
            Bson::RegularExpression(bson::Regex {
                pattern: value.regex[0].clone(),
                options: "i".to_string(),
            }),
        );
    }
    Ok(filter)
}

/// Convert a list of filter criteria into a document-store filter.
///
/// Starting from the first predicate, each subsequent element is joined with
/// the prior accumulator under `$or` or `$and` per that element's operator.
pub fn compile_filter(criteria: &[FilterCriteria]) -> Result<Document, CriteriaError> {
    let (first, rest) = criteria.split_first().ok_or(CriteriaError::Empty)?;
    let mut expr = predicate(first)?;

    for element in rest {
        let next = predicate(element)?;
        let combinator = match element.operator.to_uppercase().as_str() {
            "OR" => "$or",
            "AND" => "$and",
            _ => return Err(CriteriaError::UnknownOperator(element.operator.clone())),
        };

        let mut combined = Document::new();
        combined.insert(
            combinator,
            Bson::Array(vec![Bson::Document(expr), Bson::Document(next)]),
        );
        expr = combined;
    }

    Ok(expr)
}

/// Criteria compilation errors. All of these abort query composition.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("filter criteria is empty")]
    Empty,

    #[error("unknown criteria field '{0}'")]
    UnknownField(String),

    #[error("unknown operator '{0}' in filter criteria")]
    UnknownOperator(String),

    #[error("invalid string operator for field '{field}': more than one of eq/neq/regex is set")]
    ConflictingOperators { field: String },
}
