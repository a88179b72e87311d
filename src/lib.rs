//! specwatch — shadow, zombie, orphan and active API detection.
//!
//! This crate reconciles two views of an HTTP service's surface area: the
//! declared contract (OpenAPI v3 documents) and the empirically observed
//! traffic (API event records in a document store). Every endpoint ends up in
//! one of four buckets:
//!
//! - **Shadow**: observed in traffic but not declared in any spec.
//! - **Zombie**: observed in traffic but the declared operation is deprecated.
//! - **Orphan**: declared in a spec but never observed in traffic.
//! - **Active**: declared, not deprecated, and observed.
//!
//! The pipeline runs once per invocation: load configuration, connect to the
//! document store, load spec models and the observed event set, classify, and
//! write a JSON report.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Configuration;
pub use logging::init_tracing;
