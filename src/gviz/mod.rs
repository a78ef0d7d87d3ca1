// src/gviz/mod.rs
//
// Unwrapping of the Google Sheets visualization (`gviz/tq?tqx=out:json`)
// response: a JSON document wrapped in a JavaScript callback banner.

pub mod cell;
pub mod envelope;

pub use cell::Cell;
pub use envelope::Framing;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SheetError};

pub type Row = Vec<Cell>;

/// Column descriptor from `table.cols[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Rows of one fetch, in sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

static NULL: Cell = Cell::Null;

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Table {
            columns: Vec::new(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`); anything out of range reads as `Null`.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Index of the column whose label (or id) matches, ignoring case.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        let wanted = label.trim();
        self.columns
            .iter()
            .position(|c| c.label.trim().eq_ignore_ascii_case(wanted))
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.id.eq_ignore_ascii_case(wanted))
            })
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<Issue>,
    table: Option<RawTable>,
}

#[derive(Deserialize)]
struct Issue {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    detailed_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    cols: Vec<Column>,
    rows: Vec<RawRow>,
}

#[derive(Deserialize)]
struct RawRow {
    c: Vec<Option<RawCell>>,
}

#[derive(Deserialize)]
struct RawCell {
    #[serde(default)]
    v: Value,
}

/// Unwrap a response body with the default framing.
pub fn unwrap(raw: &str) -> Result<Table> {
    unwrap_with(raw, Framing::default())
}

/// Strip the envelope, parse the JSON and flatten `table.rows[].c[].v`.
pub fn unwrap_with(raw: &str, framing: Framing) -> Result<Table> {
    let payload = framing.strip(raw)?;
    let doc: Value =
        serde_json::from_str(payload).map_err(|e| SheetError::Parse(e.to_string()))?;
    let response: Response =
        serde_json::from_value(doc).map_err(|e| SheetError::Shape(e.to_string()))?;

    let table = match response.table {
        Some(t) => t,
        None => return Err(SheetError::Shape(missing_table(&response))),
    };

    let rows: Vec<Row> = table
        .rows
        .into_iter()
        .map(|row| {
            row.c
                .into_iter()
                .map(|cell| cell.map_or(Cell::Null, |c| Cell::from_json(c.v)))
                .collect()
        })
        .collect();

    debug!(
        rows = rows.len(),
        columns = table.cols.len(),
        "unwrapped gviz table"
    );

    Ok(Table {
        columns: table.cols,
        rows,
    })
}

fn missing_table(response: &Response) -> String {
    let issues: Vec<String> = response
        .errors
        .iter()
        .map(|e| {
            let text = e
                .detailed_message
                .as_deref()
                .or(e.message.as_deref())
                .unwrap_or("");
            format!("{} {}", e.reason, text).trim().to_string()
        })
        .collect();

    match (&response.status, issues.is_empty()) {
        (Some(status), false) => format!(
            "no `table` in response (status {}: {})",
            status,
            issues.join("; ")
        ),
        (Some(status), true) => format!("no `table` in response (status {})", status),
        (None, _) => "no `table` in response".to_string(),
    }
}
