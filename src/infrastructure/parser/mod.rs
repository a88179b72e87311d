//! OpenAPI v3 document loading and parsing.

pub mod openapi_loader;

pub use openapi_loader::{load_many, load_model, parse_model, ParseError};
