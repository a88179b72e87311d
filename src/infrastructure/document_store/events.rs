//! Loads the observed API event set from the event collection.

use std::collections::HashSet;

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::Database;
use serde::Deserialize;

use crate::config::Configuration;
use crate::domain::entities::ApiEvent;
use crate::domain::value_objects::FilterCriteria;
use crate::infrastructure::document_store::criteria::compile_filter;
use crate::infrastructure::document_store::projection::{nested_doc, nested_i64, nested_str};
use crate::infrastructure::document_store::StoreError;

/// A named criteria set stored in the api-collection.
#[derive(Debug, Deserialize)]
struct ApiCollectionRecord {
    #[serde(default)]
    #[allow(dead_code)]
    name: String,
    #[serde(default)]
    criteria: Vec<FilterCriteria>,
}

/// Queries the event collection and decodes records into a deduplicated
/// event set.
pub struct EventLoader<'a> {
    database: &'a Database,
}

impl<'a> EventLoader<'a> {
    pub fn new(database: &'a Database) -> Self {
        Self { database }
    }

    /// Load the observed event set per the configured query narrowing.
    ///
    /// Records with no usable status code are dropped; identical tuples
    /// collapse through set insertion.
    pub async fn load(&self, config: &Configuration) -> Result<HashSet<ApiEvent>, StoreError> {
        let filter = self.compose_filter(config).await?;

        let projection = doc! {
            "_id": 0,
            "cluster_name": 1,
            "api_event.http.request.headers.:authority": 1,
            "api_event.http.request.headers.host": 1,
            "api_event.http.request.method": 1,
            "api_event.http.request.path": 1,
            "api_event.http.request.body": 1,
            "api_event.http.response.status_code": 1,
            "api_event.http.response.body": 1,
            "api_event.network.destination.port": 1,
            "api_event.count": 1,
        };

        let mut cursor = self
            .database
            .collection::<Document>(&config.database.collection)
            .find(filter)
            .projection(projection)
            .await
            .map_err(StoreError::Query)?;

        let mut events = HashSet::new();
        while let Some(document) = cursor.try_next().await.map_err(StoreError::Query)? {
            if let Some(event) = decode_event(&document) {
                events.insert(event);
            }
        }

        if events.is_empty() {
            let cluster_id = config.environment.cluster_id;
            tracing::warn!(
                collection = %config.database.collection,
                cluster = %if cluster_id == 0 { "all".to_string() } else { cluster_id.to_string() },
                "no documents found in event collection"
            );
        }

        Ok(events)
    }

    async fn compose_filter(&self, config: &Configuration) -> Result<Document, StoreError> {
        let mut filter = doc! { "operation": "Api" };

        if config.environment.cluster_id != 0 {
            filter.insert("cluster_id", config.environment.cluster_id);
        }

        let api_collections = &config.api_collections;
        if !api_collections.collection_template.is_empty() && !api_collections.name_list.is_empty()
        {
            let all_criteria = self
                .criteria_by_names(
                    &api_collections.collection_template,
                    &api_collections.name_list,
                )
                .await?;
            if !all_criteria.is_empty() {
                let compiled = compile_filter(&all_criteria)?;
                filter.insert("$and", Bson::Array(vec![Bson::Document(compiled)]));
            }
        }

        if !config.endpoints.is_empty() {
            filter.insert(
                "api_event.http.request.path",
                doc! { "$in": config.endpoints.clone() },
            );
        }

        Ok(filter)
    }

    /// Fetch the criteria arrays of the named criteria sets.
    async fn criteria_by_names(
        &self,
        collection: &str,
        names: &[String],
    ) -> Result<Vec<FilterCriteria>, StoreError> {
        let filter = doc! { "name": { "$in": names.to_vec() } };

        let mut cursor = self
            .database
            .collection::<Document>(collection)
            .find(filter)
            .await
            .map_err(StoreError::Query)?;

        let mut all_criteria = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(StoreError::Query)? {
            let record: ApiCollectionRecord =
                bson::from_document(document).map_err(StoreError::DecodeCriteria)?;
            all_criteria.extend(record.criteria);
        }

        Ok(all_criteria)
    }
}

/// Decode one event record through the typed projection layer.
///
/// Returns `None` for records with no usable status code; missing parents
/// elsewhere yield zero values rather than failures.
fn decode_event(document: &Document) -> Option<ApiEvent> {
    let response_code = nested_i64(document, &["api_event", "http", "response", "status_code"]);
    if response_code == 0 {
        return None;
    }

    let mut service_name = nested_str(
        document,
        &["api_event", "http", "request", "headers", ":authority"],
    );
    if service_name.is_empty() {
        service_name = nested_str(document, &["api_event", "http", "request", "headers", "host"]);
    }

    Some(ApiEvent {
        cluster_name: nested_str(document, &["cluster_name"]),
        service_name,
        request_method: nested_str(document, &["api_event", "http", "request", "method"]),
        request_path: nested_str(document, &["api_event", "http", "request", "path"]),
        response_code,
        occurrences: nested_i64(document, &["api_event", "count"]),
        port: nested_i64(document, &["api_event", "network", "destination", "port"]),
        request: nested_doc(document, &["api_event", "http", "request"])
            .map(|d| Bson::Document(d.clone()).into_relaxed_extjson()),
        response: nested_doc(document, &["api_event", "http", "response"])
            .map(|d| Bson::Document(d.clone()).into_relaxed_extjson()),
    })
}
