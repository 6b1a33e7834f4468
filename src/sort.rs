/// DataTable Sort Engine
///
/// Orders the filtered rows by zero or more sort keys. Each key compares the
/// column values of two rows; when both rows carry a fuzzy rank for that
/// column from the latest filter pass, the better match sorts first and the
/// value comparison only breaks rank ties.
///
/// Sorting is stable: rows that compare equal on every key keep their input
/// order, so re-sorting after a filter change never shuffles equal rows.

use crate::column::{compare_f64, CellValue, ColumnSpec};
use crate::filter::FilterMeta;
use crate::table::Row;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

/// A single sort key specifying a column and order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column id to sort by
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            descending: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            descending: true,
        }
    }

    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        SortKey {
            column: column.into(),
            descending: order == SortOrder::Descending,
        }
    }

    pub fn order(&self) -> SortOrder {
        if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Ordered sort keys; the first key is the primary one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState(Vec<SortKey>);

/// unsorted -> ascending -> descending -> unsorted
fn next_order(current: Option<SortOrder>) -> Option<SortOrder> {
    match current {
        None => Some(SortOrder::Ascending),
        Some(SortOrder::Ascending) => Some(SortOrder::Descending),
        Some(SortOrder::Descending) => None,
    }
}

impl SortState {
    pub fn new(keys: Vec<SortKey>) -> Self {
        SortState(keys)
    }

    /// Advance `column` one step through its sort cycle.
    ///
    /// Without `multi` the toggled column replaces the whole sequence. With
    /// `multi` it is appended, advanced in place or removed, and the oldest
    /// keys are dropped once `max_keys` is exceeded.
    pub fn toggle(&mut self, column: &str, multi: bool, max_keys: Option<usize>) {
        let next = next_order(self.direction(column));

        if !multi {
            self.0 = next.map(|order| vec![SortKey::new(column, order)]).unwrap_or_default();
            return;
        }

        match (self.position(column), next) {
            (Some(pos), Some(order)) => self.0[pos] = SortKey::new(column, order),
            (Some(pos), None) => {
                self.0.remove(pos);
            }
            (None, Some(order)) => self.0.push(SortKey::new(column, order)),
            (None, None) => {}
        }

        if let Some(max) = max_keys {
            if self.0.len() > max {
                let excess = self.0.len() - max;
                self.0.drain(..excess);
            }
        }
    }

    pub fn direction(&self, column: &str) -> Option<SortOrder> {
        self.0.iter().find(|k| k.column == column).map(SortKey::order)
    }

    /// Position of `column` in the key sequence (0 = primary).
    pub fn position(&self, column: &str) -> Option<usize> {
        self.0.iter().position(|k| k.column == column)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn set(&mut self, keys: Vec<SortKey>) {
        self.0 = keys;
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(if prev { Chunk::Digits(&s[start..i]) } else { Chunk::Text(&s[start..i]) });
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }

    if let Some(digit) = in_digits {
        out.push(if digit { Chunk::Digits(&s[start..]) } else { Chunk::Text(&s[start..]) });
    }
    out
}

/// Compare two digit runs by numeric value without overflowing.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Case-insensitive natural ordering: `"item2" < "item10"`.
///
/// Strings are split into digit and non-digit runs. Digit runs compare
/// numerically, other runs lexicographically, and a non-digit run sorts before
/// a digit run. When one side runs out of runs first it sorts first.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let a_chunks = chunks(&a);
    let b_chunks = chunks(&b);

    for (x, y) in a_chunks.iter().zip(b_chunks.iter()) {
        let ord = match (x, y) {
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Digits(x), Chunk::Digits(y)) => compare_digits(x, y),
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Less,
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_chunks.len().cmp(&b_chunks.len())
}

/// Default per-column comparison.
///
/// Two numbers compare numerically, anything else alphanumerically by text.
/// Null sorts after every value.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Greater,
        (_, CellValue::Null) => Ordering::Less,
        (CellValue::Number(x), CellValue::Number(y)) => compare_f64(*x, *y),
        _ => compare_alphanumeric(&a.to_text(), &b.to_text()),
    }
}

/// Order `positions` (indices into `rows`) by `sorting`.
///
/// Keys naming unknown or unsortable columns are skipped. An empty sort state
/// returns the positions unchanged.
pub fn sort(
    rows: &[Row],
    positions: &[usize],
    sorting: &SortState,
    columns: &[ColumnSpec],
    meta: &FilterMeta,
) -> Vec<usize> {
    let keys: Vec<(&SortKey, &ColumnSpec)> = sorting
        .keys()
        .iter()
        .filter_map(|key| {
            columns
                .iter()
                .find(|c| c.id() == key.column && c.can_sort())
                .map(|column| (key, column))
        })
        .collect();

    if keys.is_empty() {
        return positions.to_vec();
    }

    // Extract each sort value once instead of on every comparison
    let mut decorated: Vec<(usize, Vec<CellValue>)> = positions
        .iter()
        .map(|&pos| {
            let row = &rows[pos];
            (pos, keys.iter().map(|(_, column)| column.value(row)).collect())
        })
        .collect();

    decorated.sort_by(|(pos_a, values_a), (pos_b, values_b)| {
        let row_a = &rows[*pos_a];
        let row_b = &rows[*pos_b];

        for (i, (key, column)) in keys.iter().enumerate() {
            let by_rank = match (meta.get(row_a.id(), column.id()), meta.get(row_b.id(), column.id())) {
                // Better match first
                (Some(a), Some(b)) => b.ranking.cmp(&a.ranking),
                _ => Ordering::Equal,
            };
            let ord = by_rank.then_with(|| compare_values(&values_a[i], &values_b[i]));
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    decorated.into_iter().map(|(pos, _)| pos).collect()
}
