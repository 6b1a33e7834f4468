/// DataTable Column Definitions
///
/// A ColumnSpec describes one column of the interactive table: how to pull a
/// value out of a row, which filter variant applies to it, whether it can be
/// sorted or hidden, and an optional renderer the engine forwards but never
/// inspects.
///
/// # Display Columns
///
/// Columns without an accessor (a selection checkbox column, a row actions
/// column) are display-only: they are never filtered, sorted, searched by the
/// global filter or exported, and their value is always `CellValue::Null`.

use crate::table::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A single cell value. The engine only distinguishes text and numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    /// Numeric view of the value. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String form used for matching, comparison and export.
    ///
    /// Null becomes the empty string; integral numbers print without a
    /// fractional part.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Convert a JSON value as delivered by the host page.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Text(b.to_string()),
            JsonValue::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            JsonValue::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Per-column filter UI and algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterVariant {
    /// Case-insensitive substring containment.
    Text,
    /// Inclusive numeric range with optionally open bounds.
    Range,
    /// Exact string equality against one enumerated option.
    Select,
    /// Ranked fuzzy match; records filter metadata for sort tie-breaks.
    Fuzzy,
}

pub type AccessorFn = Rc<dyn Fn(&Row) -> CellValue>;
pub type CellRenderer = Rc<dyn Fn(&Row, &CellValue) -> String>;

/// How a column pulls its value out of a row.
#[derive(Clone)]
pub enum Accessor {
    /// Read the cell stored under this key.
    Key(String),
    /// Compute the value from the whole row.
    Fn(AccessorFn),
}

impl Accessor {
    pub fn get(&self, row: &Row) -> CellValue {
        match self {
            Accessor::Key(key) => row.get(key).cloned().unwrap_or(CellValue::Null),
            Accessor::Fn(f) => f(row),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Key(key) => write!(f, "Key({:?})", key),
            Accessor::Fn(_) => write!(f, "Fn(..)"),
        }
    }
}

/// Column definition supplied by the host.
///
/// # Examples
///
/// ```
/// use datatable::{ColumnSpec, FilterVariant, Row};
///
/// let name = ColumnSpec::accessor("name").header("Name");
/// let age = ColumnSpec::accessor("age").filter_variant(FilterVariant::Range);
/// let select = ColumnSpec::display("select").sortable(false).hideable(false);
///
/// let row = Row::new(1).with("name", "Alice").with("age", 31);
/// assert_eq!(name.render(&row), "Alice");
/// assert_eq!(age.value(&row).as_f64(), Some(31.0));
/// assert!(!select.can_sort());
/// ```
#[derive(Clone)]
pub struct ColumnSpec {
    id: String,
    header: Option<String>,
    accessor: Option<Accessor>,
    filter_variant: Option<FilterVariant>,
    enable_sorting: bool,
    enable_hiding: bool,
    enable_global_filter: bool,
    renderer: Option<CellRenderer>,
}

impl ColumnSpec {
    fn with_accessor(id: String, accessor: Option<Accessor>) -> Self {
        ColumnSpec {
            id,
            header: None,
            accessor,
            filter_variant: None,
            enable_sorting: true,
            enable_hiding: true,
            enable_global_filter: true,
            renderer: None,
        }
    }

    /// A data column reading the row cell whose key equals the column id.
    pub fn accessor(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::with_accessor(key.clone(), Some(Accessor::Key(key)))
    }

    /// A data column whose value is computed from the row.
    pub fn computed<F>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Row) -> CellValue + 'static,
    {
        Self::with_accessor(id.into(), Some(Accessor::Fn(Rc::new(f))))
    }

    /// A display-only column with no value.
    pub fn display(id: impl Into<String>) -> Self {
        Self::with_accessor(id.into(), None)
    }

    pub fn header(mut self, label: impl Into<String>) -> Self {
        self.header = Some(label.into());
        self
    }

    pub fn filter_variant(mut self, variant: FilterVariant) -> Self {
        self.filter_variant = Some(variant);
        self
    }

    pub fn sortable(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn hideable(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    pub fn global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = enabled;
        self
    }

    pub fn renderer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Row, &CellValue) -> String + 'static,
    {
        self.renderer = Some(Rc::new(f));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header label, falling back to the column id.
    pub fn label(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.id)
    }

    pub fn header_label(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn accessor_ref(&self) -> Option<&Accessor> {
        self.accessor.as_ref()
    }

    /// Effective filter variant. Data columns default to `Text`.
    pub fn variant(&self) -> Option<FilterVariant> {
        self.accessor
            .as_ref()
            .map(|_| self.filter_variant.unwrap_or(FilterVariant::Text))
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    pub fn can_sort(&self) -> bool {
        self.enable_sorting && self.accessor.is_some()
    }

    pub fn can_hide(&self) -> bool {
        self.enable_hiding
    }

    pub fn can_filter(&self) -> bool {
        self.accessor.is_some()
    }

    pub fn can_global_filter(&self) -> bool {
        self.enable_global_filter && self.accessor.is_some()
    }

    /// Value of this column for `row`; `Null` for display columns.
    pub fn value(&self, row: &Row) -> CellValue {
        match &self.accessor {
            Some(accessor) => accessor.get(row),
            None => CellValue::Null,
        }
    }

    /// Forward to the host renderer, or print the raw value.
    pub fn render(&self, row: &Row) -> String {
        let value = self.value(row);
        match &self.renderer {
            Some(render) => render(row, &value),
            None => value.to_text(),
        }
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("filter_variant", &self.filter_variant)
            .field("enable_sorting", &self.enable_sorting)
            .field("enable_hiding", &self.enable_hiding)
            .field("enable_global_filter", &self.enable_global_filter)
            .field("renderer", &self.renderer.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Numeric comparison that never panics on NaN.
pub(crate) fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}
