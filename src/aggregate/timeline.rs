// src/aggregate/timeline.rs

use chrono::{NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::Serialize;

use super::Exclusion;
use crate::gviz::{Cell, Table};

/// Where a row's event time is read from. Blank primary cells fall back to
/// the second column (e.g. the form submission timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeColumns {
    pub primary: usize,
    pub fallback: Option<usize>,
}

impl TimeColumns {
    pub fn new(primary: usize, fallback: Option<usize>) -> Self {
        TimeColumns { primary, fallback }
    }

    pub fn event_time(&self, table: &Table, row: usize) -> Option<NaiveDateTime> {
        let primary = table.cell(row, self.primary);
        if !primary.is_null() {
            return primary.as_datetime();
        }
        self.fallback
            .and_then(|col| table.cell(row, col).as_datetime())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub at: NaiveDateTime,
    pub value: f64,
}

/// Running totals per category and over every counted row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cumulative {
    pub series: IndexMap<Cell, Vec<Point>>,
    pub total: Vec<Point>,
}

/// What each event adds to a running total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Weight {
    /// 1 per event: a running count.
    #[default]
    Unit,
    /// The numeric value of this column; blank or non-numeric cells add 0.
    Column(usize),
}

impl Weight {
    fn of(&self, table: &Table, row: usize) -> f64 {
        match *self {
            Weight::Unit => 1.0,
            Weight::Column(col) => match table.cell(row, col) {
                Cell::Number(n) if n.is_finite() => *n,
                Cell::Text(s) => s
                    .trim()
                    .trim_start_matches('$')
                    .replace(',', "")
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .unwrap_or(0.0),
                _ => 0.0,
            },
        }
    }
}

/// Optional bounds on event time, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl Window {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

/// Rows that carry both an admitted category and a decodable time.
fn timed_rows(
    table: &Table,
    time: TimeColumns,
    category: usize,
    exclusion: Exclusion,
) -> Vec<(NaiveDateTime, usize, &Cell)> {
    (0..table.len())
        .filter_map(|row| {
            let cat = table.cell(row, category);
            if !exclusion.admits(cat) {
                return None;
            }
            time.event_time(table, row).map(|at| (at, row, cat))
        })
        .collect()
}

/// Per category, how many events fell into each hour of the day.
pub fn hour_of_day(
    table: &Table,
    time: TimeColumns,
    category: usize,
    exclusion: Exclusion,
) -> IndexMap<Cell, [u64; 24]> {
    let mut out: IndexMap<Cell, [u64; 24]> = IndexMap::new();
    for (at, _, cat) in timed_rows(table, time, category, exclusion) {
        let hours = out.entry(cat.clone()).or_insert([0; 24]);
        hours[at.hour() as usize] += 1;
    }
    out
}

/// Per category, events in time order with a running total of `weight`.
///
/// Categories come out sorted by label. Every series, `total` included, is
/// anchored at `(start, 0)` and `(end, last)`, where an open bound of the
/// window falls back to the earliest/latest event in the table.
pub fn cumulative(
    table: &Table,
    time: TimeColumns,
    category: usize,
    exclusion: Exclusion,
    weight: Weight,
    window: Window,
) -> Cumulative {
    let mut rows = timed_rows(table, time, category, exclusion);
    // stable, so same-instant events keep sheet order
    rows.sort_by_key(|(at, _, _)| *at);

    let (first, last) = match (rows.first(), rows.last()) {
        (Some(f), Some(l)) => (f.0, l.0),
        _ => return Cumulative::default(),
    };
    let start = window.start.unwrap_or(first);
    let end = window.end.unwrap_or(last);
    rows.retain(|(at, _, _)| window.contains(*at));
    if rows.is_empty() {
        return Cumulative::default();
    }

    let mut out = Cumulative::default();
    let mut running = 0.0;
    for (at, row, cat) in rows {
        let w = weight.of(table, row);
        let series = out.series.entry(cat.clone()).or_default();
        let value = series.last().map_or(0.0, |p| p.value) + w;
        series.push(Point { at, value });
        running += w;
        out.total.push(Point { at, value: running });
    }

    out.series.sort_by(|a, _, b, _| a.to_string().cmp(&b.to_string()));
    for points in out.series.values_mut().chain(std::iter::once(&mut out.total)) {
        anchor(points, start, end);
    }
    out
}

fn anchor(points: &mut Vec<Point>, start: NaiveDateTime, end: NaiveDateTime) {
    let last = points.last().map_or(0.0, |p| p.value);
    points.insert(0, Point { at: start, value: 0.0 });
    points.push(Point { at: end, value: last });
}
