//! Report assembly and JSON export.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::Configuration;
use crate::domain::entities::{ApiFinding, ApiReport, ApiSpecFile};
use crate::domain::path::{normalize_path, templates_equivalent};
use crate::domain::value_objects::SpecModel;

use super::use_cases::ReconciliationOutcome;

/// Assemble the report: scoped spec files, per-finding spec associations,
/// duplicate removal, and the scan timestamp.
pub fn build_report(
    config: &Configuration,
    models: &BTreeMap<String, SpecModel>,
    outcome: ReconciliationOutcome,
) -> ApiReport {
    let scoped_api_spec_files = models
        .iter()
        .map(|(source, model)| ApiSpecFile {
            file_name: source.clone(),
            title: model.title.clone(),
        })
        .collect();

    let mut shadow_apis = remove_duplicate_findings(outcome.shadow_apis);
    let mut zombie_apis = remove_duplicate_findings(outcome.zombie_apis);
    let mut orphan_apis = remove_duplicate_findings(outcome.orphan_apis);
    let mut active_apis = remove_duplicate_findings(outcome.active_apis);

    attach_associated_spec_files(&mut shadow_apis, models);
    attach_associated_spec_files(&mut zombie_apis, models);
    attach_associated_spec_files(&mut orphan_apis, models);
    attach_associated_spec_files(&mut active_apis, models);

    ApiReport {
        tenant_id: config.environment.tenant_id,
        scan_name: config.scan_name.clone(),
        scan_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        scoped_api_spec_files,
        collections: config.api_collections.name_list.clone(),
        shadow_apis,
        zombie_apis,
        orphan_apis,
        active_apis,
    }
}

/// For each finding, record which spec files declare its path with a
/// matching operation method.
pub fn attach_associated_spec_files(
    findings: &mut [ApiFinding],
    models: &BTreeMap<String, SpecModel>,
) {
    if findings.is_empty() || models.is_empty() {
        return;
    }

    for finding in findings.iter_mut() {
        let method = finding.request_method.to_uppercase();
        let mut associated = Vec::new();

        for (source, model) in models {
            if declares(model, &finding.request_path, &method) {
                let file = ApiSpecFile {
                    file_name: source.clone(),
                    title: model.title.clone(),
                };
                if !associated.contains(&file) {
                    associated.push(file);
                }
            }
        }

        finding.associated_api_spec_files = associated;
    }
}

/// Whether a model declares `path` (exact template or template-equivalent
/// normalized match) with an operation of `method_upper`.
fn declares(model: &SpecModel, path: &str, method_upper: &str) -> bool {
    model.paths.iter().any(|spec_path| {
        let path_matches = spec_path.template == path
            || templates_equivalent(path, &normalize_path(&spec_path.template, true));
        path_matches
            && spec_path
                .operations
                .iter()
                .any(|op| op.method.to_uppercase() == method_upper)
    })
}

/// Drop duplicate findings keyed by `(METHOD, requestPath, serviceName)`,
/// keeping the first representative of each key.
pub fn remove_duplicate_findings(findings: Vec<ApiFinding>) -> Vec<ApiFinding> {
    let mut seen = std::collections::HashSet::new();
    findings
        .into_iter()
        .filter(|finding| {
            seen.insert((
                finding.request_method.to_uppercase(),
                finding.request_path.clone(),
                finding.service_name.clone(),
            ))
        })
        .collect()
}

/// Write the report as pretty-printed JSON with 1-space indentation,
/// truncating any prior content.
pub fn write_json_report(report: &ApiReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    report
        .serialize(&mut serializer)
        .map_err(ReportError::Serialize)?;

    writer.flush().map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(())
}

/// Report export errors.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),
}
