/// DataTable Filter Engine
///
/// Evaluates per-column filters and the global fuzzy filter against every row
/// and produces the visible subset as positions into the row slice, together
/// with the fuzzy ranks collected along the way (`FilterMeta`), which the sort
/// engine later uses as a tie-break.
///
/// The engine always recomputes from the full row list and is deterministic:
/// identical inputs give identical output, and feeding its output back in with
/// the same filters yields the same rows.

use crate::column::{compare_f64, CellValue, ColumnSpec, FilterVariant};
use crate::error::FilterError;
use crate::rank::{rank_item, ItemRank, RankOptions};
use crate::selection::ColumnVisibility;
use crate::table::{Row, RowId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Inclusive numeric range; a `None` bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        NumberRange { min, max }
    }

    /// Build a range from raw input text. Empty or unparseable text leaves
    /// that bound open.
    pub fn from_inputs(min: &str, max: &str) -> Self {
        NumberRange {
            min: Self::parse_bound(min).unwrap_or(None),
            max: Self::parse_bound(max).unwrap_or(None),
        }
    }

    /// Parse one bound. Blank input is an open bound, not an error.
    pub fn parse_bound(text: &str) -> Result<Option<f64>, FilterError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => Err(FilterError::MalformedNumber(text.to_string())),
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(FilterError::MalformedNumber(text.to_string())),
        }
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Bounds with `min <= max`, swapping reversed input.
    pub fn normalized(&self) -> (f64, f64) {
        let min = self.min.unwrap_or(f64::NEG_INFINITY);
        let max = self.max.unwrap_or(f64::INFINITY);
        if compare_f64(min, max) == Ordering::Greater {
            (max, min)
        } else {
            (min, max)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let (min, max) = self.normalized();
        value >= min && value <= max
    }
}

/// Value of one column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Query for `Text`, `Select` and `Fuzzy` columns.
    Text(String),
    /// Bounds for `Range` columns.
    Range(NumberRange),
}

impl FilterValue {
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Text(s.into())
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range(NumberRange::new(min, max))
    }

    /// Inactive values never narrow the row set and are auto-removed.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) => !s.is_empty(),
            FilterValue::Range(range) => !range.is_open(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&NumberRange> {
        match self {
            FilterValue::Range(range) => Some(range),
            FilterValue::Text(_) => None,
        }
    }
}

/// A filter bound to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterValue,
}

/// Active column filters in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnFilters(Vec<ColumnFilter>);

impl ColumnFilters {
    pub fn new() -> Self {
        ColumnFilters(Vec::new())
    }

    /// Set or replace a column's filter; an inactive value removes it.
    pub fn set(&mut self, id: &str, value: FilterValue) {
        if !value.is_active() {
            self.remove(id);
            return;
        }
        match self.0.iter_mut().find(|f| f.id == id) {
            Some(existing) => existing.value = value,
            None => self.0.push(ColumnFilter {
                id: id.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.0.iter().find(|f| f.id == id).map(|f| &f.value)
    }

    pub fn remove(&mut self, id: &str) -> Option<FilterValue> {
        let pos = self.0.iter().position(|f| f.id == id)?;
        Some(self.0.remove(pos).value)
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

    pub fn iter(&self) -> impl Iterator<Item = &ColumnFilter> {
        self.0.iter()
    }
}

/// Everything the filter stage reads: column filters plus the global query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub columns: ColumnFilters,
    pub global: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.columns.is_empty() || !self.global.is_empty()
    }
}

/// Fuzzy ranks recorded per row and column during one filter pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterMeta {
    ranks: HashMap<RowId, HashMap<String, ItemRank>>,
}

impl FilterMeta {
    pub fn new() -> Self {
        FilterMeta::default()
    }

    pub fn insert(&mut self, row: &RowId, column: &str, rank: ItemRank) {
        self.ranks
            .entry(row.clone())
            .or_default()
            .insert(column.to_string(), rank);
    }

    pub fn get(&self, row: &RowId, column: &str) -> Option<&ItemRank> {
        self.ranks.get(row).and_then(|columns| columns.get(column))
    }

    /// Number of rows carrying at least one rank.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Result of one filter pass.
#[derive(Debug, Clone, Default)]
pub struct FilterOutput {
    /// Positions of visible rows, in input order.
    pub visible: Vec<usize>,
    pub meta: FilterMeta,
}

/// A column filter resolved against its column, ready to evaluate.
enum Predicate<'a> {
    Contains(String),
    Equals(&'a str),
    Range(NumberRange),
    Fuzzy(&'a str),
}

fn resolve<'a>(filter: &'a ColumnFilter, column: Option<&'a ColumnSpec>) -> Option<(&'a ColumnSpec, Predicate<'a>)> {
    let column = match column {
        Some(column) if column.can_filter() => column,
        _ => {
            log::debug!("ignoring filter on unknown or display column '{}'", filter.id);
            return None;
        }
    };

    let predicate = match (column.variant(), &filter.value) {
        (Some(FilterVariant::Text), FilterValue::Text(query)) => Predicate::Contains(query.to_lowercase()),
        (Some(FilterVariant::Select), FilterValue::Text(option)) => Predicate::Equals(option),
        (Some(FilterVariant::Range), FilterValue::Range(range)) => Predicate::Range(*range),
        (Some(FilterVariant::Fuzzy), FilterValue::Text(query)) => Predicate::Fuzzy(query),
        (variant, value) => {
            log::debug!(
                "ignoring malformed filter on '{}': {:?} does not fit {:?}",
                filter.id,
                value,
                variant
            );
            return None;
        }
    };

    Some((column, predicate))
}

fn passes(value: &CellValue, predicate: &Predicate<'_>) -> bool {
    match predicate {
        Predicate::Contains(needle) => {
            !value.is_null() && value.to_text().to_lowercase().contains(needle.as_str())
        }
        Predicate::Equals(option) => value.to_text() == *option,
        Predicate::Range(range) => value.as_f64().map(|n| range.contains(n)).unwrap_or(false),
        // Evaluated separately so the rank can be recorded
        Predicate::Fuzzy(_) => true,
    }
}

/// Run the filter stage over `rows`.
pub fn apply(
    rows: &[Row],
    columns: &[ColumnSpec],
    state: &FilterState,
    visibility: &ColumnVisibility,
    options: &RankOptions,
) -> FilterOutput {
    let predicates: Vec<(&ColumnSpec, Predicate<'_>)> = state
        .columns
        .iter()
        .filter_map(|filter| resolve(filter, columns.iter().find(|c| c.id() == filter.id)))
        .collect();

    let global_columns: Vec<&ColumnSpec> = if state.global.is_empty() {
        Vec::new()
    } else {
        columns
            .iter()
            .filter(|c| c.can_global_filter() && visibility.is_visible(c.id()))
            .collect()
    };

    let mut output = FilterOutput::default();

    for (pos, row) in rows.iter().enumerate() {
        let mut visible = true;

        for (column, predicate) in &predicates {
            let value = column.value(row);
            let ok = match predicate {
                Predicate::Fuzzy(query) => {
                    let rank = rank_item(&value, query, options);
                    let passed = rank.passed;
                    output.meta.insert(row.id(), column.id(), rank);
                    passed
                }
                other => passes(&value, other),
            };
            if !ok {
                visible = false;
                break;
            }
        }

        if visible && !global_columns.is_empty() {
            // Rank every eligible column so sorting sees a complete picture
            let mut any = false;
            for column in &global_columns {
                let rank = rank_item(&column.value(row), &state.global, options);
                any |= rank.passed;
                output.meta.insert(row.id(), column.id(), rank);
            }
            visible = any;
        }

        if visible {
            output.visible.push(pos);
        }
    }

    output
}
