use http::Uri;
use std::time::Duration;

use crate::cli::Cli;
use crate::ingest::IngestPolicy;
use crate::lifecycle::PollPolicy;
use crate::types::ApiKey;

/// Resolved runtime configuration, CLI/env values with defaults applied.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_endpoint: Uri,
    pub api_key: Option<ApiKey>,
    pub model_name: String,
    pub asset_name: String,
    pub request_timeout: Duration,
    pub lifecycle: PollPolicy,
    pub ingest: IngestPolicy,
    pub history_poll_interval: Duration,
    /// Half-width of the queried window around the ingestion instant.
    pub history_window: Duration,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let lifecycle_defaults = PollPolicy::default();
        let ingest_defaults = IngestPolicy::default();

        Self {
            api_endpoint: cli.api_endpoint,
            api_key: cli.api_key,
            model_name: cli.model_name,
            asset_name: cli.asset_name,
            request_timeout: cli.request_timeout.unwrap_or(Duration::from_secs(30)),
            lifecycle: PollPolicy {
                interval: cli
                    .lifecycle_poll_interval
                    .unwrap_or(lifecycle_defaults.interval),
                max_wait: cli.lifecycle_max_wait.unwrap_or(lifecycle_defaults.max_wait),
                max_transient_retries: cli
                    .lifecycle_max_retries
                    .unwrap_or(lifecycle_defaults.max_transient_retries),
                max_backoff: lifecycle_defaults.max_backoff,
            },
            ingest: IngestPolicy {
                page_size: cli
                    .ingest_page_size
                    .map(usize::from)
                    .unwrap_or(ingest_defaults.page_size),
                page_interval: cli
                    .ingest_page_interval
                    .unwrap_or(ingest_defaults.page_interval),
            },
            history_poll_interval: cli.history_poll_interval.unwrap_or(Duration::from_secs(10)),
            history_window: cli.history_window.unwrap_or(Duration::from_secs(600)),
        }
    }
}
