//! IoT Sentinel Core - Bootstrap Entry Point
//!
//! Load config, open the store, load or bootstrap the model, then replay
//! JSON-lines telemetry from stdin through the pipeline. One JSON outcome per
//! input line on stdout.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use sentinel_core::constants;
use sentinel_core::logic::analysis::TelemetryPipeline;
use sentinel_core::logic::config::PipelineConfig;
use sentinel_core::logic::model::AnomalyModel;
use sentinel_core::logic::store::SqliteStore;
use sentinel_core::logic::telemetry::to_reading;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting IoT Sentinel Core v{}...", constants::APP_VERSION);

    if let Err(e) = run().await {
        log::error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = PipelineConfig::from_env();
    log::info!("Model: {}", config.model_path.display());
    log::info!("Database: {}", config.database_path.display());

    let store = Arc::new(
        SqliteStore::open(&config.database_path).context("failed to open telemetry store")?,
    );

    let model = {
        let config = config.clone();
        Arc::new(tokio::task::spawn_blocking(move || AnomalyModel::open(&config)).await?)
    };

    if model.is_trained() {
        log::info!("Model loaded, status {}", model.status());
    } else if config.auto_bootstrap {
        log::info!(
            "No usable model ({}), bootstrap training on {} synthetic samples",
            model.status(),
            config.bootstrap_samples
        );
        let trainer = Arc::clone(&model);
        let (samples, contamination) = (config.bootstrap_samples, config.contamination);
        if !tokio::task::spawn_blocking(move || trainer.train(samples, contamination)).await? {
            log::warn!("Bootstrap training failed - statistical fallback only");
        }
    } else {
        log::info!("Model status {}, auto bootstrap disabled", model.status());
    }

    let report = model.status_report();
    if report.training_source.as_ref().is_some_and(|s| s.is_synthetic()) {
        log::warn!("Model was trained on the synthetic baseline; retrain on real telemetry when available");
    }

    let pipeline = TelemetryPipeline::with_store(Arc::clone(&model), Arc::clone(&store), &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (mut processed, mut anomalies, mut skipped) = (0u64, 0u64, 0u64);

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reading = match serde_json::from_str::<serde_json::Value>(line)
            .map_err(|e| e.to_string())
            .and_then(|payload| to_reading(&payload))
        {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("Skipping telemetry line: {}", e);
                skipped += 1;
                continue;
            }
        };

        let outcome = pipeline.process(&reading).await;
        processed += 1;
        if outcome.decision.is_anomaly {
            anomalies += 1;
        }
        println!("{}", serde_json::to_string(&outcome)?);
    }

    log::info!(
        "Replay finished: {} processed, {} anomalies, {} skipped",
        processed,
        anomalies,
        skipped
    );

    match store.dashboard_summary() {
        Ok(summary) => log::info!("Dashboard: {}", serde_json::to_string(&summary)?),
        Err(e) => log::warn!("Dashboard summary unavailable: {}", e),
    }

    Ok(())
}
