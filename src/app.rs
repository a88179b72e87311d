//! Pipeline wiring: one reconciliation run per invocation.

use std::path::Path;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::reporting;
use crate::application::use_cases::ReconcileApisUseCase;
use crate::config::Configuration;
use crate::infrastructure::document_store::{EventLoader, StoreHandle};
use crate::infrastructure::parser;

/// Run the reconciliation pipeline.
///
/// Failures are reported through logs; the process still exits 0. The only
/// non-zero exit is the forced second-signal path in `main`.
pub async fn run(config_path: &Path, shutdown: CancellationToken) {
    info!("starting specwatch");

    if let Err(e) = try_run(config_path, shutdown).await {
        error!(error = %e, "reconciliation run failed");
    }
}

async fn try_run(config_path: &Path, shutdown: CancellationToken) -> anyhow::Result<()> {
    let config = Configuration::load(config_path)?;

    let store = tokio::select! {
        handle = StoreHandle::connect(&config.database) => handle?,
        _ = shutdown.cancelled() => {
            info!("shutdown requested before the store connection was established");
            return Ok(());
        }
    };

    // The store client stays scoped to this run: disconnect on every path.
    let result = run_pipeline(&config, &store, shutdown).await;
    store.disconnect().await;
    result
}

async fn run_pipeline(
    config: &Configuration,
    store: &StoreHandle,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let mut spec_locations = vec![config.open_api_spec.clone()];
    spec_locations.extend(config.api_spec_files.iter().cloned());

    let models = tokio::select! {
        models = parser::load_many(&spec_locations) => models,
        _ = shutdown.cancelled() => {
            info!("shutdown requested while loading specs");
            return Ok(());
        }
    };
    if models.is_empty() {
        anyhow::bail!("no usable OpenAPI specification could be loaded");
    }
    info!(specs = models.len(), "loaded spec models");

    let loader = EventLoader::new(&store.database);
    let events = tokio::select! {
        events = loader.load(config) => events.context("failed to load API events")?,
        _ = shutdown.cancelled() => {
            info!("shutdown requested while loading events");
            return Ok(());
        }
    };
    info!(events = events.len(), "loaded observed event set");

    if shutdown.is_cancelled() {
        info!("shutdown requested before classification");
        return Ok(());
    }

    let tries = ReconcileApisUseCase::build_tries(&models);
    let outcome = ReconcileApisUseCase::execute(&events, &models, &tries);

    let report = reporting::build_report(config, &models, outcome);
    let report_path = Path::new(&config.exporter.json_report_file_path);
    reporting::write_json_report(&report, report_path)?;

    info!(
        report = %config.exporter.json_report_file_path,
        "successfully generated JSON report"
    );
    Ok(())
}
