// src/gviz/cell.rs

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// One scalar cell value as published by the gviz endpoint.
///
/// Equality is strict per scalar type: `Number(2.0)` and `Text("2")` are
/// different values, while `1` and `1.0` are the same number.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Convert the `v` field of a gviz cell object.
    ///
    /// Non-scalar values (gviz encodes `timeofday` as `[h, m, s, ms]`) are
    /// kept as their compact JSON text.
    pub fn from_json(v: Value) -> Self {
        match v {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Cell::Number(f),
                None => Cell::Text(n.to_string()),
            },
            Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Truthiness the way a browser script sees it: `null`, `false`, `0`,
    /// `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Null => false,
            Cell::Bool(b) => *b,
            Cell::Number(n) => *n != 0.0 && !n.is_nan(),
            Cell::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Decode a timestamp cell: gviz `Date(y,m,d[,h,mi,s[,ms]])` literals
    /// (zero-based month) or common spreadsheet text layouts.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        let s = self.as_str()?.trim();
        parse_gviz_date(s).or_else(|| parse_text_datetime(s))
    }

    fn key_bits(n: f64) -> u64 {
        // fold -0.0 into 0.0 so both hash and compare alike
        if n == 0.0 {
            0
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => Cell::key_bits(*a) == Cell::key_bits(*b),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null => {}
            Cell::Bool(b) => b.hash(state),
            Cell::Number(n) => Cell::key_bits(*n).hash(state),
            Cell::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Number(n) if *n == 0.0 => f.write_str("0"),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

static GVIZ_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Date\((\d{1,4}),(\d{1,2}),(\d{1,2})(?:,(\d{1,2}),(\d{1,2}),(\d{1,2})(?:,(\d{1,3}))?)?\)$")
        .expect("gviz date pattern is valid")
});

const TEXT_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

fn parse_gviz_date(s: &str) -> Option<NaiveDateTime> {
    let caps = GVIZ_DATE.captures(s)?;
    let num = |i: usize| -> Option<u32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let year: i32 = caps[1].parse().ok()?;
    // zero-based month
    let month = num(2)? + 1;
    let date = NaiveDate::from_ymd_opt(year, month, num(3)?)?;
    date.and_hms_milli_opt(num(4)?, num(5)?, num(6)?, num(7)?)
}

fn parse_text_datetime(s: &str) -> Option<NaiveDateTime> {
    TEXT_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
