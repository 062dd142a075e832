use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument};

use crate::remote::{ApiError, AssetApi};
use crate::telemetry::ValueSample;
use crate::types::{AssetId, PropertyId};

/// Result cap the remote enforces on a single history query.
///
/// Ranges holding more samples than this would need caller-side
/// pagination, which this demo does not attempt.
pub const HISTORY_LIMIT: u32 = 1000;

/// One bounded-range query for a property's computed values.
pub async fn fetch_history<A: AssetApi + ?Sized>(
    api: &A,
    asset: &AssetId,
    property: &PropertyId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ValueSample>, ApiError> {
    api.history(asset, property, start, end, HISTORY_LIMIT).await
}

/// Periodically dump the full history of every property until `end`
/// passes.
///
/// Each cycle re-queries the whole window for each property and prints
/// whatever the remote has computed so far. Deliberately non-incremental:
/// the same samples are fetched again every cycle, which is fine for a
/// short demo window.
#[instrument(skip_all, fields(asset = %asset), err)]
pub async fn watch<A: AssetApi + ?Sized>(
    api: &A,
    asset: &AssetId,
    properties: &[(String, PropertyId)],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
) -> Result<(), ApiError> {
    info!("dumping computed values every {interval:?} until {end}");

    while Utc::now() < end {
        sleep(interval).await;

        for (name, property) in properties {
            let samples = fetch_history(api, asset, property, start, end).await?;

            println!("{name} ({property})");
            if samples.is_empty() {
                println!("\t(empty)");
            }
            for sample in &samples {
                println!("\t{}\t{}", sample.timestamp, sample.value);
            }
        }
    }

    Ok(())
}
