//! The four-way classification engine.
//!
//! Joins the observed event set against the loaded spec models and emits
//! shadow, zombie, orphan and active findings. Traffic paths and spec
//! templates are compared in normalized form, where `{…}` parameter segments
//! are mutually equivalent.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::domain::entities::{ApiEvent, ApiFinding, FindingType};
use crate::domain::path::{normalize_path, split_path_query, templates_equivalent};
use crate::domain::trie::PathTrie;
use crate::domain::value_objects::{SpecModel, SpecPath};

/// Path prefixes excluded from shadow/zombie detection.
const SKIP_PREFIXES: [&str; 4] = ["/assets", "/site", "/sites", "env"];
/// Path suffixes excluded from shadow/zombie detection.
const SKIP_SUFFIXES: [&str; 5] = ["env", "png", "svg", "gif", "js"];

/// The classified outcome of one reconciliation run.
#[derive(Debug, Default)]
pub struct ReconciliationOutcome {
    pub shadow_apis: Vec<ApiFinding>,
    pub zombie_apis: Vec<ApiFinding>,
    pub orphan_apis: Vec<ApiFinding>,
    pub active_apis: Vec<ApiFinding>,
}

/// Use case reconciling observed traffic against declared spec models.
pub struct ReconcileApisUseCase;

impl ReconcileApisUseCase {
    /// Build one path trie per model from its declared templates.
    pub fn build_tries(models: &BTreeMap<String, SpecModel>) -> BTreeMap<String, PathTrie<SpecPath>> {
        let mut tries = BTreeMap::new();
        for (source, model) in models {
            let mut trie = PathTrie::new();
            for spec_path in &model.paths {
                if let Err(e) = trie.insert(&spec_path.template, spec_path.clone()) {
                    warn!(spec = %source, template = %spec_path.template, error = %e, "skipping unusable path template");
                }
            }
            tries.insert(source.clone(), trie);
        }
        tries
    }

    /// Classify every endpoint as shadow, zombie, orphan or active.
    #[instrument(skip_all, fields(events = events.len(), models = models.len()))]
    pub fn execute(
        events: &HashSet<ApiEvent>,
        models: &BTreeMap<String, SpecModel>,
        tries: &BTreeMap<String, PathTrie<SpecPath>>,
    ) -> ReconciliationOutcome {
        // The event set is unordered; sort for reproducible finding lists.
        let mut sorted: Vec<&ApiEvent> = events.iter().collect();
        sorted.sort_by(|a, b| {
            (
                &a.service_name,
                &a.request_method,
                &a.request_path,
                &a.cluster_name,
                a.response_code,
            )
                .cmp(&(
                    &b.service_name,
                    &b.request_method,
                    &b.request_path,
                    &b.cluster_name,
                    b.response_code,
                ))
        });

        let (shadow_apis, zombie_apis) = Self::find_shadow_and_zombie_apis(&sorted, models, tries);
        let orphan_apis = Self::find_orphan_apis(&sorted, models);
        let active_apis = Self::find_active_apis(&sorted, models);

        info!(
            shadow = shadow_apis.len(),
            zombie = zombie_apis.len(),
            orphan = orphan_apis.len(),
            active = active_apis.len(),
            "reconciliation completed"
        );

        ReconciliationOutcome {
            shadow_apis,
            zombie_apis,
            orphan_apis,
            active_apis,
        }
    }

    /// One pass over the events detecting shadow and zombie endpoints.
    fn find_shadow_and_zombie_apis(
        events: &[&ApiEvent],
        models: &BTreeMap<String, SpecModel>,
        tries: &BTreeMap<String, PathTrie<SpecPath>>,
    ) -> (Vec<ApiFinding>, Vec<ApiFinding>) {
        let mut shadow_apis = Vec::new();
        let mut zombie_apis = Vec::new();
        let mut shadow_seen = HashSet::new();
        let mut zombie_seen = HashSet::new();

        for event in events {
            let (raw_path, _) = split_path_query(&event.request_path);
            if should_skip(raw_path) {
                continue;
            }

            let normalized_path = normalize_path(raw_path, false);

            // The normalized cross-spec scan is authoritative. Trie hits only
            // widen path discovery under a union; a trie miss proves nothing,
            // since lookup takes an exact child without backtracking and a
            // literal sibling can mask a `{…}` sibling at the same depth.
            let (path_found, method_exists) =
                scan_models(models, &normalized_path, &event.request_method);
            let path_found =
                path_found || tries.values().any(|trie| trie.get(raw_path).is_some());

            if !path_found || !method_exists {
                let key = dedup_key(&event.request_method, &normalized_path, &event.service_name);
                if shadow_seen.insert(key) {
                    debug!(
                        method = %event.request_method,
                        path = %normalized_path,
                        "observed endpoint missing from declared contract"
                    );
                    shadow_apis.push(ApiFinding::from_event(
                        event,
                        &normalized_path,
                        FindingType::Shadow,
                    ));
                }
            }

            // Zombie: any deprecated operation declared at an equivalent
            // template marks the event, regardless of method.
            let deprecated_declared = models.values().any(|model| {
                model.paths.iter().any(|spec_path| {
                    templates_equivalent(
                        &normalized_path,
                        &normalize_path(&spec_path.template, true),
                    ) && spec_path.operations.iter().any(|op| op.is_deprecated())
                })
            });
            if deprecated_declared {
                let key = dedup_key(&event.request_method, &normalized_path, &event.service_name);
                if zombie_seen.insert(key) {
                    zombie_apis.push(ApiFinding::from_event(
                        event,
                        &normalized_path,
                        FindingType::Zombie,
                    ));
                }
            }
        }

        (shadow_apis, zombie_apis)
    }

    /// Declared operations that never received traffic.
    fn find_orphan_apis(
        events: &[&ApiEvent],
        models: &BTreeMap<String, SpecModel>,
    ) -> Vec<ApiFinding> {
        let trafficked: Vec<(String, String)> = {
            let mut keys = HashSet::new();
            for event in events {
                let (raw_path, _) = split_path_query(&event.request_path);
                keys.insert((
                    event.request_method.to_uppercase(),
                    normalize_path(raw_path, false),
                ));
            }
            keys.into_iter().collect()
        };

        let mut orphan_apis = Vec::new();
        let mut seen = HashSet::new();

        for model in models.values() {
            for spec_path in &model.paths {
                let template = normalize_path(&spec_path.template, true);
                for operation in &spec_path.operations {
                    let method = operation.method.to_uppercase();
                    let observed = trafficked.iter().any(|(event_method, event_path)| {
                        *event_method == method && templates_equivalent(event_path, &template)
                    });
                    if !observed && seen.insert((method.clone(), template.clone())) {
                        orphan_apis.push(ApiFinding::orphan(&method, &template));
                    }
                }
            }
        }

        orphan_apis
    }

    /// Declared, non-deprecated operations with observed traffic, with
    /// occurrences aggregated per endpoint.
    fn find_active_apis(
        events: &[&ApiEvent],
        models: &BTreeMap<String, SpecModel>,
    ) -> Vec<ApiFinding> {
        struct Aggregate {
            cluster_name: String,
            service_name: String,
            request_method: String,
            request_path: String,
            occurrences: i64,
            status_code: i64,
            port: i64,
            request: Option<serde_json::Value>,
            response: Option<serde_json::Value>,
        }

        // Keyed by (cluster, service, METHOD, normalized path); occurrences
        // sum, the remaining metadata keeps the last-seen value.
        let mut trafficked: BTreeMap<(String, String, String, String), Aggregate> = BTreeMap::new();

        for event in events {
            let (raw_path, _) = split_path_query(&event.request_path);
            let normalized_path = normalize_path(raw_path, false);
            let method = event.request_method.to_uppercase();
            let key = (
                event.cluster_name.clone(),
                event.service_name.clone(),
                method.clone(),
                normalized_path.clone(),
            );

            trafficked
                .entry(key)
                .and_modify(|entry| {
                    entry.occurrences += event.occurrences;
                    entry.status_code = event.response_code;
                    entry.port = event.port;
                    entry.request = event.request.clone();
                    entry.response = event.response.clone();
                })
                .or_insert_with(|| Aggregate {
                    cluster_name: event.cluster_name.clone(),
                    service_name: event.service_name.clone(),
                    request_method: method,
                    request_path: normalized_path,
                    occurrences: event.occurrences,
                    status_code: event.response_code,
                    port: event.port,
                    request: event.request.clone(),
                    response: event.response.clone(),
                });
        }

        let mut active_apis = Vec::new();
        let mut seen = HashSet::new();

        for model in models.values() {
            for spec_path in &model.paths {
                let template = normalize_path(&spec_path.template, true);
                for operation in &spec_path.operations {
                    if operation.is_deprecated() {
                        // Deprecated operations are zombies, not actives.
                        continue;
                    }
                    let method = operation.method.to_uppercase();

                    for entry in trafficked.values() {
                        if entry.request_method != method
                            || !templates_equivalent(&entry.request_path, &template)
                        {
                            continue;
                        }
                        let key = (
                            entry.cluster_name.clone(),
                            entry.service_name.clone(),
                            method.clone(),
                            template.clone(),
                        );
                        if seen.insert(key) {
                            active_apis.push(ApiFinding {
                                cluster_name: entry.cluster_name.clone(),
                                service_name: entry.service_name.clone(),
                                request_method: entry.request_method.clone(),
                                request_path: entry.request_path.clone(),
                                occurrences: entry.occurrences,
                                severity: FindingType::Active.severity(),
                                status_code: entry.status_code,
                                port: entry.port,
                                request: entry.request.clone(),
                                response: entry.response.clone(),
                                associated_api_spec_files: Vec::new(),
                                finding_type: FindingType::Active,
                            });
                        }
                    }
                }
            }
        }

        active_apis
    }
}

/// Whether a raw request path is excluded from shadow/zombie detection.
fn should_skip(raw_path: &str) -> bool {
    raw_path == "/"
        || SKIP_PREFIXES.iter().any(|p| raw_path.starts_with(p))
        || SKIP_SUFFIXES.iter().any(|s| raw_path.ends_with(s))
}

/// Search every model for a template equivalent to `normalized_path`,
/// tracking whether any matched path declares `method`.
fn scan_models(
    models: &BTreeMap<String, SpecModel>,
    normalized_path: &str,
    method: &str,
) -> (bool, bool) {
    let mut path_found = false;
    let mut method_exists = false;

    for model in models.values() {
        for spec_path in &model.paths {
            if templates_equivalent(normalized_path, &normalize_path(&spec_path.template, true)) {
                path_found = true;
                if spec_path.has_method(method) {
                    method_exists = true;
                }
            }
        }
    }

    (path_found, method_exists)
}

fn dedup_key(method: &str, path: &str, service: &str) -> (String, String, String) {
    (method.to_uppercase(), path.to_string(), service.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_filter_covers_assets_and_root() {
        assert!(should_skip("/"));
        assert!(should_skip("/assets/logo.png"));
        assert!(should_skip("/site/index"));
        assert!(should_skip("/app/bundle.js"));
        assert!(should_skip("/config/.env"));
        assert!(!should_skip("/api/v1/users"));
    }

    #[test]
    fn scan_tracks_path_and_method_independently() {
        let mut models = BTreeMap::new();
        models.insert(
            "spec.yaml".to_string(),
            SpecModel {
                source: "spec.yaml".to_string(),
                title: String::new(),
                paths: vec![SpecPath {
                    template: "/users/{id}".to_string(),
                    operations: vec![crate::domain::value_objects::SpecOperation {
                        method: "get".to_string(),
                        deprecated: None,
                    }],
                }],
            },
        );

        assert_eq!(scan_models(&models, "/users/{param1}", "GET"), (true, true));
        assert_eq!(
            scan_models(&models, "/users/{param1}", "POST"),
            (true, false)
        );
        assert_eq!(scan_models(&models, "/orders/{param1}", "GET"), (false, false));
    }
}
