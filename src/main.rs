mod cli;
mod config;
mod demo;
mod history;
mod ingest;
mod lifecycle;
mod model;
mod remote;
mod telemetry;
#[cfg(test)]
mod testutil;
mod types;
mod util;

use anyhow::Result;
use config::Config;
use remote::HttpApi;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for human-readable logs
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or(
                EnvFilter::default()
                    .add_directive("info".parse()?)
                    .add_directive("hyper=error".parse()?)
                    .add_directive("reqwest=warn".parse()?),
            ),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .event_format(fmt::format().compact().with_target(false).without_time()),
        )
        .init();

    let config = Config::from(cli::parse());
    info!("configuration loaded");
    debug!("{config:#?}");

    let api = HttpApi::new(
        config.api_endpoint.clone(),
        config.request_timeout,
        config.api_key.clone(),
    );

    demo::run(&config, &api).await
}
