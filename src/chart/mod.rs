// src/chart/mod.rs
//
// Chart descriptions handed to an external renderer. The bar chart is laid
// out as a Chart.js config (`type`, `data.labels`, `data.datasets`,
// `options`); nothing here draws.

pub mod sink;

pub use sink::{ChartSink, JsonFileSink, StdoutSink};

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::{
    timeline::{Cumulative, Point},
    CategoryCounts,
};
use crate::gviz::Cell;

pub const FILL_COLOR: &str = "rgba(54, 162, 235, 0.5)";
pub const BORDER_COLOR: &str = "rgba(54, 162, 235, 1)";
pub const DEFAULT_LABEL: &str = "Beverage Consumption";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub begin_at_zero: bool,
}

impl BarChart {
    /// One dataset, labels and bars in the tally's first-seen order.
    pub fn from_counts(counts: &CategoryCounts, label: &str) -> Self {
        BarChart {
            kind: "bar",
            data: ChartData {
                labels: counts.labels(),
                datasets: vec![Dataset {
                    label: label.to_string(),
                    data: counts.counts(),
                    background_color: FILL_COLOR.to_string(),
                    border_color: BORDER_COLOR.to_string(),
                    border_width: 1,
                }],
            },
            options: ChartOptions {
                responsive: true,
                scales: Scales {
                    y: Axis {
                        begin_at_zero: true,
                    },
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourSeries {
    pub label: String,
    pub hours: [u64; 24],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeSeries {
    pub label: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDocument {
    pub chart: BarChart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour_of_day: Option<Vec<HourSeries>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative: Option<Vec<CumulativeSeries>>,
    /// Running spend, same layout as `cumulative`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_cost: Option<Vec<CumulativeSeries>>,
}

impl ChartDocument {
    pub fn new(chart: BarChart) -> Self {
        ChartDocument {
            chart,
            hour_of_day: None,
            cumulative: None,
            cumulative_cost: None,
        }
    }
}

pub fn hour_series(hours: &IndexMap<Cell, [u64; 24]>) -> Vec<HourSeries> {
    hours
        .iter()
        .map(|(cat, h)| HourSeries {
            label: cat.to_string(),
            hours: *h,
        })
        .collect()
}

/// Per-category series first, then a `Total` series.
pub fn cumulative_series(cum: &Cumulative) -> Vec<CumulativeSeries> {
    let points = |pts: &[Point]| pts.iter().map(|p| (p.at, p.value)).collect::<Vec<_>>();

    let mut out: Vec<CumulativeSeries> = cum
        .series
        .iter()
        .map(|(cat, pts)| CumulativeSeries {
            label: cat.to_string(),
            points: points(pts),
        })
        .collect();
    if !cum.total.is_empty() {
        out.push(CumulativeSeries {
            label: "Total".to_string(),
            points: points(&cum.total),
        });
    }
    out
}
