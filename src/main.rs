use anyhow::Result;
use reqwest::Client;
use sheettally::{
    chart::{ChartSink, JsonFileSink, StdoutSink},
    config::Config,
    pipeline,
};
use std::{env, process::ExitCode};
use tokio::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(
        url = %config.sheet_url,
        category = %config.category,
        framing = ?config.framing,
        exclusion = ?config.exclusion,
        "startup"
    );

    // ─── 3) fetch → unwrap → tally ───────────────────────────────────
    let client = Client::new();
    let start = Instant::now();
    let doc = pipeline::run(&client, &config).await?;
    info!(
        bars = doc.chart.data.labels.len(),
        elapsed = ?start.elapsed(),
        "chart ready"
    );

    // ─── 4) hand off to the renderer ─────────────────────────────────
    let sink: Box<dyn ChartSink> = match &config.chart_out {
        Some(path) => Box::new(JsonFileSink::new(path)),
        None => Box::new(StdoutSink),
    };
    sink.draw(&doc)?;

    info!("all done");
    Ok(())
}
