/// DataTable Row Set
///
/// A Table is the immutable row set plus column definitions the host supplies
/// for one render pass. The engine never mutates row contents; it only keeps
/// metadata about rows (selection, filter rank) keyed by their stable id.

use crate::column::{CellValue, ColumnSpec};
use crate::error::TableError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Stable row identity used for selection and filter metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

impl From<i32> for RowId {
    fn from(n: i32) -> Self {
        RowId(n.to_string())
    }
}

impl From<i64> for RowId {
    fn from(n: i64) -> Self {
        RowId(n.to_string())
    }
}

impl From<u64> for RowId {
    fn from(n: u64) -> Self {
        RowId(n.to_string())
    }
}

impl From<usize> for RowId {
    fn from(n: usize) -> Self {
        RowId(n.to_string())
    }
}

/// One record keyed by column id.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    cells: HashMap<String, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<RowId>) -> Self {
        Row {
            id: id.into(),
            cells: HashMap::new(),
        }
    }

    /// Builder-style cell setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }

    pub fn cells(&self) -> &HashMap<String, CellValue> {
        &self.cells
    }

    /// Build a row from a JSON object, reading its id from `id_key`.
    ///
    /// The id cell is kept so it can be shown, filtered and exported like any
    /// other column.
    pub fn from_json(value: &JsonValue, id_key: &str) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;

        let id = match object.get(id_key) {
            Some(JsonValue::String(s)) => RowId::from(s.as_str()),
            Some(JsonValue::Number(n)) => RowId(n.to_string()),
            Some(other) => return Err(format!("id '{}' must be a string or number, got {}", id_key, other)),
            None => return Err(format!("missing id field '{}'", id_key)),
        };

        let cells = object
            .iter()
            .map(|(key, value)| (key.clone(), CellValue::from_json(value)))
            .collect();

        Ok(Row { id, cells })
    }
}

/// Parse a JSON array of objects into rows.
pub fn rows_from_json(json: &str, id_key: &str) -> Result<Vec<Row>, TableError> {
    let value: JsonValue = serde_json::from_str(json)?;
    let items = value.as_array().ok_or_else(|| TableError::InvalidRow {
        index: 0,
        reason: "expected a JSON array of rows".to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Row::from_json(item, id_key).map_err(|reason| TableError::InvalidRow { index, reason })
        })
        .collect()
}

/// Immutable rows and columns for one render pass.
///
/// # Examples
///
/// ```
/// use datatable::{ColumnSpec, Row, Table};
///
/// let columns = vec![ColumnSpec::accessor("name"), ColumnSpec::accessor("email")];
/// let rows = vec![
///     Row::new(1).with("name", "Alice").with("email", "alice@x.com"),
///     Row::new(2).with("name", "Bob").with("email", "bob@x.com"),
/// ];
///
/// let table = Table::new(columns, rows).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.position(&2.into()), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    index: HashMap<RowId, usize>,
}

impl Table {
    /// Create a table, rejecting duplicate column or row ids.
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Row>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id().to_string()) {
                return Err(TableError::DuplicateColumn(column.id().to_string()));
            }
        }

        let index = Self::build_index(&rows)?;
        Ok(Table { columns, rows, index })
    }

    fn build_index(rows: &[Row]) -> Result<HashMap<RowId, usize>, TableError> {
        let mut index = HashMap::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            if index.insert(row.id().clone(), pos).is_some() {
                return Err(TableError::DuplicateRow(row.id().clone()));
            }
        }
        Ok(index)
    }

    /// Same columns, new rows (the host refreshed its dataset).
    pub fn with_rows(&self, rows: Vec<Row>) -> Result<Self, TableError> {
        let index = Self::build_index(&rows)?;
        Ok(Table {
            columns: self.columns.clone(),
            rows,
            index,
        })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.id() == id)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.index.get(id).map(|&pos| &self.rows[pos])
    }

    pub fn position(&self, id: &RowId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
