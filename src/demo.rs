use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::model::{self, MEASUREMENT_NAME};
use crate::remote::AssetApi;
use crate::types::PropertyId;
use crate::{history, ingest, lifecycle};

/// The fixed end-to-end workflow: recreate the demo model and asset,
/// ingest the synthetic series and watch the computed values roll in.
#[instrument(skip_all, err)]
pub async fn run<A: AssetApi + ?Sized>(config: &Config, api: &A) -> Result<()> {
    // Start from a clean slate, a previous run leaves its model behind
    if let Some(existing) = lifecycle::find_model_by_name(api, &config.model_name).await? {
        info!("removing model {existing} left over from a previous run");
        lifecycle::delete_model(api, &existing, &config.lifecycle).await?;
    }

    info!("creating model {}", config.model_name);
    let definition = model::demo_model(&config.model_name);
    let model_id = lifecycle::create_model(api, &definition, &config.lifecycle)
        .await
        .context("model creation failed")?;

    let asset_id =
        lifecycle::create_asset(api, &config.asset_name, &model_id, &config.lifecycle).await?;

    let description = api
        .describe_model(&model_id)
        .await?
        .with_context(|| format!("model {model_id} disappeared after creation"))?;

    println!(
        "Model {} ({}) has the following properties:",
        description.name, description.id
    );
    for property in &description.properties {
        println!("\t{}\t{}\t{:?}", property.name, property.id, property.kind);
    }

    let measurement = description
        .properties
        .iter()
        .find(|p| p.name == MEASUREMENT_NAME)
        .with_context(|| format!("model {model_id} has no {MEASUREMENT_NAME} property"))?;

    // Give the remote a moment to finish wiring up the new asset
    sleep(Duration::from_secs(1)).await;

    let now = Utc::now();
    let series = ingest::generate_series(now);
    info!("ingesting {} synthetic points", series.len());
    let report = ingest::submit(api, &series, &asset_id, &measurement.id, &config.ingest).await?;
    if !report.is_complete() {
        warn!(
            "{} of {} points were rejected by the remote",
            report.failures.len(),
            report.points
        );
    }

    sleep(Duration::from_secs(1)).await;

    let window =
        TimeDelta::from_std(config.history_window).context("history window out of range")?;
    let properties: Vec<(String, PropertyId)> = description
        .properties
        .iter()
        .map(|p| (p.name.clone(), p.id.clone()))
        .collect();

    history::watch(
        api,
        &asset_id,
        &properties,
        now - window,
        now + window,
        config.history_poll_interval,
    )
    .await?;

    Ok(())
}
