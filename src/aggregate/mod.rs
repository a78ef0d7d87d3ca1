// src/aggregate/mod.rs

pub mod timeline;

use anyhow::bail;
use indexmap::IndexMap;
use std::str::FromStr;
use tracing::debug;

use crate::gviz::{Cell, Table};

/// Which category cells are left out of a tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Exclusion {
    /// Only empty cells (and cells past the end of a short row).
    #[default]
    Null,
    /// Every falsy value: empty, `false`, `0` and `""`. Matches the
    /// browser page that first drew this chart.
    Falsy,
}

impl Exclusion {
    pub fn admits(&self, cell: &Cell) -> bool {
        match self {
            Exclusion::Null => !cell.is_null(),
            Exclusion::Falsy => cell.is_truthy(),
        }
    }
}

impl FromStr for Exclusion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "null" | "strict" => Ok(Exclusion::Null),
            "falsy" => Ok(Exclusion::Falsy),
            other => bail!("unknown exclusion {:?}, expected null or falsy", other),
        }
    }
}

/// Category → row count, iterated in the order categories were first seen.
#[derive(Debug, Clone, Default)]
pub struct CategoryCounts {
    counts: IndexMap<Cell, u64>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: Cell) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &Cell) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cell, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    pub fn labels(&self) -> Vec<String> {
        self.counts.keys().map(ToString::to_string).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.counts.values().copied().collect()
    }
}

/// Order-sensitive: two tallies are equal only if they list the same
/// categories in the same order.
impl PartialEq for CategoryCounts {
    fn eq(&self, other: &Self) -> bool {
        self.counts.iter().eq(other.counts.iter())
    }
}

impl Eq for CategoryCounts {}

/// Tally `column` of every row, leaving out empty cells.
pub fn aggregate(table: &Table, column: usize) -> CategoryCounts {
    aggregate_with(table, column, Exclusion::Null)
}

pub fn aggregate_with(table: &Table, column: usize, exclusion: Exclusion) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    let mut skipped = 0usize;

    for row in 0..table.len() {
        let cell = table.cell(row, column);
        if exclusion.admits(cell) {
            counts.increment(cell.clone());
        } else {
            skipped += 1;
        }
    }

    debug!(
        column,
        categories = counts.len(),
        counted = counts.total(),
        skipped,
        "aggregated"
    );
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(v: &str) -> Cell {
        Cell::from(v)
    }

    fn drinks() -> Table {
        Table::from_rows(vec![
            vec![t("Alice"), t("Tea")],
            vec![t("Bob"), t("Coffee")],
            vec![t("Carol"), t("Tea")],
            vec![t("Dave"), Cell::Null],
        ])
    }

    #[test]
    fn test_counts_in_first_seen_order() {
        let counts = aggregate(&drinks(), 1);
        assert_eq!(counts.labels(), vec!["Tea", "Coffee"]);
        assert_eq!(counts.counts(), vec![2, 1]);
        assert_eq!(counts.get(&t("Tea")), Some(2));
        assert_eq!(counts.get(&Cell::Null), None);
    }

    #[test]
    fn test_empty_table() {
        let empty = Table::default();
        for column in [0, 1, 7] {
            assert!(aggregate(&empty, column).is_empty());
        }
    }

    #[test]
    fn test_all_null_column() {
        let table = Table::from_rows(vec![
            vec![t("a"), Cell::Null],
            vec![t("b"), Cell::Null],
        ]);
        assert!(aggregate(&table, 1).is_empty());
    }

    #[test]
    fn test_short_row_reads_as_null() {
        let table = Table::from_rows(vec![vec![t("X")]]);
        assert!(aggregate(&table, 1).is_empty());

        let table = Table::from_rows(vec![vec![t("X")], vec![t("Y"), t("Tea")]]);
        assert_eq!(aggregate(&table, 1).counts(), vec![1]);
    }

    #[test]
    fn test_order_independent_of_counts() {
        let table = Table::from_rows(vec![
            vec![t("Water")],
            vec![t("Tea")],
            vec![t("Tea")],
            vec![t("Tea")],
            vec![t("Coffee")],
            vec![t("Coffee")],
        ]);
        let counts = aggregate(&table, 0);
        assert_eq!(counts.labels(), vec!["Water", "Tea", "Coffee"]);
        assert_eq!(counts.counts(), vec![1, 3, 2]);
    }

    #[test]
    fn test_total_matches_non_null_rows() {
        let table = Table::from_rows(vec![
            vec![t("a"), t("x")],
            vec![t("b")],
            vec![t("c"), Cell::Null],
            vec![t("d"), Cell::Number(2.0)],
            vec![t("e"), t("x")],
            vec![],
        ]);
        let counts = aggregate(&table, 1);
        let non_null = (0..table.len())
            .filter(|&r| !table.cell(r, 1).is_null())
            .count() as u64;
        assert_eq!(counts.total(), non_null);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_number_and_string_are_distinct() {
        let table = Table::from_rows(vec![
            vec![Cell::Number(2.0)],
            vec![t("2")],
            vec![Cell::Number(2.0)],
        ]);
        let counts = aggregate(&table, 0);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(&Cell::Number(2.0)), Some(2));
        assert_eq!(counts.get(&t("2")), Some(1));
    }

    #[test]
    fn test_falsy_exclusion() {
        let table = Table::from_rows(vec![
            vec![Cell::Number(0.0)],
            vec![t("")],
            vec![Cell::Bool(false)],
            vec![Cell::Null],
            vec![t("Tea")],
        ]);
        let strict = aggregate_with(&table, 0, Exclusion::Null);
        assert_eq!(strict.len(), 4);
        assert_eq!(strict.total(), 4);

        let falsy = aggregate_with(&table, 0, Exclusion::Falsy);
        assert_eq!(falsy.labels(), vec!["Tea"]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let mut a = CategoryCounts::new();
        a.increment(t("Tea"));
        a.increment(t("Coffee"));
        let mut b = CategoryCounts::new();
        b.increment(t("Coffee"));
        b.increment(t("Tea"));
        assert_ne!(a, b);
        assert_eq!(a, aggregate(&drinks_without_dave(), 1));
    }

    fn drinks_without_dave() -> Table {
        Table::from_rows(vec![vec![t("Alice"), t("Tea")], vec![t("Bob"), t("Coffee")]])
    }

    #[test]
    fn test_exclusion_from_str() {
        assert_eq!("falsy".parse::<Exclusion>().unwrap(), Exclusion::Falsy);
        assert_eq!("NULL".parse::<Exclusion>().unwrap(), Exclusion::Null);
        assert!("zero".parse::<Exclusion>().is_err());
    }
}
