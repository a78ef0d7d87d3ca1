// src/config.rs

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use std::{convert::Infallible, env, path::PathBuf, str::FromStr};
use url::Url;

use crate::aggregate::{timeline::Window, Exclusion};
use crate::chart::DEFAULT_LABEL;
use crate::fetch::gviz_url;
use crate::gviz::{Cell, Framing, Table};

/// The beverage log sheet the chart was first built for.
pub const DEFAULT_SHEET_KEY: &str = "1axUmdj7sbmA7wn0gTVU-tr4bMiXoLd1ntRdXdEdQwOU";

/// A column by zero-based position or by header label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Label(String),
}

impl ColumnRef {
    pub fn resolve(&self, table: &Table) -> Option<usize> {
        match self {
            ColumnRef::Index(i) => Some(*i),
            ColumnRef::Label(label) => table.column_index(label),
        }
    }
}

impl FromStr for ColumnRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(i) => ColumnRef::Index(i),
            Err(_) => ColumnRef::Label(s.to_string()),
        })
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{}", i),
            ColumnRef::Label(l) => write!(f, "{:?}", l),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sheet_url: Url,
    pub category: ColumnRef,
    pub framing: Framing,
    pub exclusion: Exclusion,
    pub chart_label: String,
    /// `None` writes to stdout.
    pub chart_out: Option<PathBuf>,
    pub time_column: Option<ColumnRef>,
    pub time_fallback: Option<ColumnRef>,
    /// Summed into the cost-over-time series when present in the sheet.
    pub cost_column: Option<ColumnRef>,
    pub window: Window,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sheet_url: gviz_url(DEFAULT_SHEET_KEY, None).expect("default sheet URL is valid"),
            category: ColumnRef::Index(1),
            framing: Framing::default(),
            exclusion: Exclusion::default(),
            chart_label: DEFAULT_LABEL.to_string(),
            chart_out: None,
            time_column: Some(ColumnRef::Label("bev time".to_string())),
            time_fallback: Some(ColumnRef::Label("Timestamp".to_string())),
            cost_column: Some(ColumnRef::Label("bev cost".to_string())),
            window: Window::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value source. Unset keys keep their defaults;
    /// `TIME_COLUMN`, `TIME_FALLBACK_COLUMN` or `COST_COLUMN` set to ""
    /// switch that column off.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();

        if let Some(url) = lookup("SHEET_URL") {
            cfg.sheet_url = Url::parse(url.trim()).with_context(|| format!("SHEET_URL {:?}", url))?;
        } else if lookup("SHEET_KEY").is_some() || lookup("SHEET_NAME").is_some() {
            let key = lookup("SHEET_KEY").unwrap_or_else(|| DEFAULT_SHEET_KEY.to_string());
            let sheet = lookup("SHEET_NAME");
            cfg.sheet_url = gviz_url(&key, sheet.as_deref())?;
        }

        if let Some(v) = lookup("CATEGORY_COLUMN") {
            cfg.category = v.parse::<ColumnRef>()?;
        }
        if let Some(v) = lookup("FRAMING") {
            cfg.framing = v.parse::<Framing>().context("FRAMING")?;
        }
        if let Some(v) = lookup("EXCLUDE") {
            cfg.exclusion = v.parse::<Exclusion>().context("EXCLUDE")?;
        }
        if let Some(v) = lookup("CHART_LABEL") {
            cfg.chart_label = v;
        }
        if let Some(v) = lookup("CHART_OUT").filter(|v| !v.trim().is_empty()) {
            cfg.chart_out = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("TIME_COLUMN") {
            cfg.time_column = optional_column(&v)?;
        }
        if let Some(v) = lookup("TIME_FALLBACK_COLUMN") {
            cfg.time_fallback = optional_column(&v)?;
        }
        if let Some(v) = lookup("COST_COLUMN") {
            cfg.cost_column = optional_column(&v)?;
        }
        if let Some(v) = lookup("WINDOW_START") {
            cfg.window.start = optional_time(&v).context("WINDOW_START")?;
        }
        if let Some(v) = lookup("WINDOW_END") {
            cfg.window.end = optional_time(&v).context("WINDOW_END")?;
        }

        Ok(cfg)
    }
}

fn optional_column(v: &str) -> Result<Option<ColumnRef>> {
    if v.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(v.parse::<ColumnRef>()?))
    }
}

/// Same layouts the sheet cells accept, e.g. `2024-01-15` or
/// `2024-01-15 08:00:00`.
fn optional_time(v: &str) -> Result<Option<NaiveDateTime>> {
    if v.trim().is_empty() {
        return Ok(None);
    }
    Cell::from(v)
        .as_datetime()
        .map(Some)
        .ok_or_else(|| anyhow!("unrecognised date {:?}", v))
}
