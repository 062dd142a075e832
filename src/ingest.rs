use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::remote::{ApiError, AssetApi, BatchEntry, BatchPutRequest, EntryFailure};
use crate::telemetry::DataPoint;
use crate::types::{AssetId, EntryId, PropertyId};

/// How a series is paged out to the remote.
#[derive(Debug, Clone)]
pub struct IngestPolicy {
    /// Points per batched write request.
    pub page_size: usize,
    /// Fixed pause between consecutive pages.
    pub page_interval: Duration,
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_interval: Duration::from_secs(1),
        }
    }
}

/// Aggregate outcome of one series submission.
///
/// Rejected entries are collected here rather than aborting the run, so
/// the caller decides whether partial ingestion is acceptable.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub points: usize,
    pub pages: usize,
    pub failures: Vec<EntryFailure>,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Floor an instant to the preceding 10-minute boundary.
pub fn floor_to_10_minutes(t: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = t.timestamp();
    let floored = seconds - seconds.rem_euclid(600);
    DateTime::from_timestamp(floored, 0).expect("flooring keeps the timestamp in range")
}

/// Deterministic synthetic series covering the 10-minute window that
/// contains `start`.
///
/// Minutes 3, 4 and 9 are left empty on purpose, simulating missing
/// telemetry so the gap handling of the computed metrics can be observed.
pub fn generate_series(start: DateTime<Utc>) -> Vec<DataPoint> {
    let base = floor_to_10_minutes(start);
    let at = |minutes: i64, seconds: i64| base + TimeDelta::seconds(minutes * 60 + seconds);

    vec![
        DataPoint::new(1.0, at(0, 1)),
        DataPoint::new(0.0, at(1, 1)),
        DataPoint::new(2.0, at(2, 1)),
        DataPoint::new(0.0, at(5, 0)),
        DataPoint::new(1.0, at(5, 20)),
        DataPoint::new(0.0, at(5, 40)),
        DataPoint::new(1.0, at(6, 0)),
        DataPoint::new(2.0, at(7, 1)),
        DataPoint::new(3.0, at(8, 1)),
    ]
}

/// Split a series into pages of at most `page_size` points, preserving
/// order. The last page may be short; an empty series has no pages.
pub fn split_pages(series: &[DataPoint], page_size: usize) -> Vec<&[DataPoint]> {
    if series.is_empty() {
        return Vec::new();
    }
    series.chunks(page_size.max(1)).collect()
}

/// Submit a series to one asset property, one batched request per page.
///
/// Each page carries a single entry under a fresh idempotency id. Pages
/// are paced with a fixed pause and entries rejected by the remote are
/// reported, not retried; only request-level failures abort.
#[instrument(skip_all, fields(asset = %asset, property = %property, points = series.len()), err)]
pub async fn submit<A: AssetApi + ?Sized>(
    api: &A,
    series: &[DataPoint],
    asset: &AssetId,
    property: &PropertyId,
    policy: &IngestPolicy,
) -> Result<IngestReport, ApiError> {
    let mut report = IngestReport {
        points: series.len(),
        ..Default::default()
    };

    let pages = split_pages(series, policy.page_size);
    let total = pages.len();

    for (index, page) in pages.into_iter().enumerate() {
        let request = BatchPutRequest {
            entries: vec![BatchEntry {
                entry: EntryId::default(),
                asset: asset.clone(),
                property: property.clone(),
                values: page.to_vec(),
            }],
        };

        let response = api.put_batch(&request).await?;
        report.pages += 1;

        if response.failures.is_empty() {
            debug!(
                "page {}/{total} accepted ({} points)",
                index + 1,
                page.len()
            );
        } else {
            for failure in &response.failures {
                warn!(
                    "entry {} rejected with {}: {}",
                    failure.entry, failure.code, failure.message
                );
            }
            report.failures.extend(response.failures);
        }

        if index + 1 < total {
            sleep(policy.page_interval).await;
        }
    }

    Ok(report)
}
