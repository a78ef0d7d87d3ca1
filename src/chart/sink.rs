// src/chart/sink.rs

use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use super::ChartDocument;

/// Whatever finally puts the chart on a surface.
pub trait ChartSink {
    fn draw(&self, doc: &ChartDocument) -> Result<()>;
}

/// Writes the document as pretty JSON to a file, creating parent dirs.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileSink {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ChartSink for JsonFileSink {
    fn draw(&self, doc: &ChartDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, json).with_context(|| format!("writing {:?}", self.path))?;
        info!(path = %self.path.display(), bars = doc.chart.data.labels.len(), "wrote chart");
        Ok(())
    }
}

/// Writes the document as one line of JSON to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ChartSink for StdoutSink {
    fn draw(&self, doc: &ChartDocument) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, doc)?;
        writeln!(out)?;
        Ok(())
    }
}
