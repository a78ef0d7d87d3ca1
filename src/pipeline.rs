// src/pipeline.rs

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{
    aggregate_with,
    timeline::{self, Weight},
};
use crate::chart::{cumulative_series, hour_series, BarChart, ChartDocument};
use crate::config::Config;
use crate::error::{Result, SheetError};
use crate::fetch::fetch_sheet;
use crate::gviz;

/// Fetch the sheet and turn it into a chart document.
#[instrument(level = "info", skip(client, config), fields(url = %config.sheet_url))]
pub async fn run(client: &Client, config: &Config) -> Result<ChartDocument> {
    let body = fetch_sheet(client, &config.sheet_url).await?;
    build_document(&body, config)
}

/// Everything after the network call: unwrap, tally, describe.
pub fn build_document(body: &str, config: &Config) -> Result<ChartDocument> {
    let table = gviz::unwrap_with(body, config.framing)?;

    let category = config.category.resolve(&table).ok_or_else(|| {
        SheetError::Shape(format!("no column {} in sheet", config.category))
    })?;

    let counts = aggregate_with(&table, category, config.exclusion);
    info!(
        rows = table.len(),
        categories = counts.len(),
        counted = counts.total(),
        "tallied"
    );

    let mut doc = ChartDocument::new(BarChart::from_counts(&counts, &config.chart_label));

    let primary = config.time_column.as_ref().and_then(|c| c.resolve(&table));
    match primary {
        Some(primary) => {
            let fallback = config.time_fallback.as_ref().and_then(|c| c.resolve(&table));
            let time = timeline::TimeColumns::new(primary, fallback);
            let hours = timeline::hour_of_day(&table, time, category, config.exclusion);
            let cumulative = |weight: Weight| {
                let cum = timeline::cumulative(
                    &table,
                    time,
                    category,
                    config.exclusion,
                    weight,
                    config.window,
                );
                cumulative_series(&cum)
            };
            doc.hour_of_day = Some(hour_series(&hours));
            doc.cumulative = Some(cumulative(Weight::Unit));

            match config.cost_column.as_ref().map(|c| (c, c.resolve(&table))) {
                Some((_, Some(cost))) => {
                    doc.cumulative_cost = Some(cumulative(Weight::Column(cost)));
                }
                Some((column, None)) => {
                    debug!(%column, "no cost column; skipping cost series");
                }
                None => {}
            }
        }
        None => {
            if let Some(column) = &config.time_column {
                warn!(%column, "time column not found; skipping time breakdowns");
            }
        }
    }

    Ok(doc)
}
