//! Typed projection over nested BSON documents.
//!
//! Event records arrive as dynamic nested maps whose numeric fields may be
//! int32, int64, double, or even strings. Every field the loader consumes
//! goes through these helpers: absence and type mismatches yield zero values,
//! never failures.

use bson::{Bson, Document};

/// Navigate a path of keys through nested documents.
pub fn nested<'a>(document: &'a Document, path: &[&str]) -> Option<&'a Bson> {
    let (last, parents) = path.split_last()?;
    let mut current = document;
    for key in parents {
        current = current.get(*key).and_then(Bson::as_document)?;
    }
    current.get(*last)
}

/// Nested string value; empty string when absent or not a string.
pub fn nested_str(document: &Document, path: &[&str]) -> String {
    nested(document, path)
        .and_then(Bson::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Nested integer value; 0 when absent or uninterpretable.
pub fn nested_i64(document: &Document, path: &[&str]) -> i64 {
    nested(document, path).and_then(coerce_i64).unwrap_or(0)
}

/// Nested subdocument.
pub fn nested_doc<'a>(document: &'a Document, path: &[&str]) -> Option<&'a Document> {
    nested(document, path).and_then(Bson::as_document)
}

/// Interpret a BSON value as an integer, accepting the numeric encodings the
/// store actually produces.
pub fn coerce_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) => Some(*n as i64),
        Bson::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
