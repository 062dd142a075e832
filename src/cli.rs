use clap::Parser;
use http::Uri;
use std::num::ParseIntError;
use std::time::Duration;

use crate::types::ApiKey;

fn parse_duration(s: &str) -> Result<Duration, ParseIntError> {
    let millis: u64 = s.parse()?;
    Ok(Duration::from_millis(millis))
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)] // read from Cargo.toml
pub struct Cli {
    /// Remote telemetry API endpoint URI
    #[arg(
        env = "SITEWATCH_API_ENDPOINT",
        long = "api-endpoint",
        value_name = "uri"
    )]
    pub api_endpoint: Uri,

    /// API key for authentication with the remote
    #[arg(env = "SITEWATCH_API_KEY", long = "api-key", value_name = "key")]
    pub api_key: Option<ApiKey>,

    /// Name of the demo asset model
    #[arg(
        env = "SITEWATCH_MODEL_NAME",
        long = "model-name",
        value_name = "name",
        default_value = "demo-model"
    )]
    pub model_name: String,

    /// Name of the demo asset
    #[arg(
        env = "SITEWATCH_ASSET_NAME",
        long = "asset-name",
        value_name = "name",
        default_value = "demo-asset"
    )]
    pub asset_name: String,

    /// Remote request timeout in milliseconds
    #[arg(
        env = "SITEWATCH_REQUEST_TIMEOUT_MS",
        long = "request-timeout-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub request_timeout: Option<Duration>,

    /// Interval between lifecycle status polls in milliseconds
    #[arg(
        env = "SITEWATCH_LIFECYCLE_POLL_INTERVAL_MS",
        long = "lifecycle-poll-interval-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub lifecycle_poll_interval: Option<Duration>,

    /// Maximum time to wait for a lifecycle transition in milliseconds
    #[arg(
        env = "SITEWATCH_LIFECYCLE_MAX_WAIT_MS",
        long = "lifecycle-max-wait-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub lifecycle_max_wait: Option<Duration>,

    /// Consecutive transient failures tolerated while polling
    #[arg(
        env = "SITEWATCH_LIFECYCLE_MAX_RETRIES",
        long = "lifecycle-max-retries",
        value_name = "count"
    )]
    pub lifecycle_max_retries: Option<u32>,

    /// Points per ingestion page
    #[arg(
        env = "SITEWATCH_INGEST_PAGE_SIZE",
        long = "ingest-page-size",
        value_name = "count",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub ingest_page_size: Option<u16>,

    /// Pause between ingestion pages in milliseconds
    #[arg(
        env = "SITEWATCH_INGEST_PAGE_INTERVAL_MS",
        long = "ingest-page-interval-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub ingest_page_interval: Option<Duration>,

    /// Interval between history poll cycles in milliseconds
    #[arg(
        env = "SITEWATCH_HISTORY_POLL_INTERVAL_MS",
        long = "history-poll-interval-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub history_poll_interval: Option<Duration>,

    /// Half-width of the history query window in milliseconds
    #[arg(
        env = "SITEWATCH_HISTORY_WINDOW_MS",
        long = "history-window-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub history_window: Option<Duration>,
}

pub fn parse() -> Cli {
    Parser::parse()
}
