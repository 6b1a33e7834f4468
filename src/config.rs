/// DataTable Configuration
///
/// Options are plain serde structs. Every field has a default, so a partial
/// JSON document (or none at all) produces a working configuration.

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::error::TableError;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::rank::RankOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// CSV export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub field_separator: char,
    pub quote_character: char,
    /// Quote every non-numeric field, not only those that need it.
    pub quote_strings: bool,
    /// Replaces `.` in exported numbers.
    pub decimal_separator: String,
    /// Prefix the output with a UTF-8 byte order mark.
    pub use_bom: bool,
    /// File name without the `.csv` extension.
    pub filename: String,
    /// Header cells use column ids instead of labels.
    pub use_keys_as_headers: bool,
    pub show_column_headers: bool,
    /// Skip columns the user has hidden.
    pub visible_columns_only: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            field_separator: ',',
            quote_character: '"',
            quote_strings: true,
            decimal_separator: ".".to_string(),
            use_bom: false,
            filename: "sample".to_string(),
            use_keys_as_headers: true,
            show_column_headers: true,
            visible_columns_only: false,
        }
    }
}

impl ExportOptions {
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_field_separator(mut self, separator: char) -> Self {
        self.field_separator = separator;
        self
    }

    pub fn with_decimal_separator(mut self, separator: impl Into<String>) -> Self {
        self.decimal_separator = separator.into();
        self
    }

    pub fn with_bom(mut self, enabled: bool) -> Self {
        self.use_bom = enabled;
        self
    }

    pub fn with_visible_columns_only(mut self, enabled: bool) -> Self {
        self.visible_columns_only = enabled;
        self
    }

    /// File name including the extension.
    pub fn file_name(&self) -> String {
        if self.filename.ends_with(".csv") {
            self.filename.clone()
        } else {
            format!("{}.csv", self.filename)
        }
    }
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    /// Quiet period before a typed filter is applied.
    pub debounce_ms: u64,
    pub enable_multi_sort: bool,
    /// Oldest sort keys are dropped beyond this many.
    pub max_multi_sort: Option<usize>,
    /// Jump back to the first page whenever filters or sorting change.
    pub auto_reset_page_index: bool,
    pub keep_diacritics: bool,
    pub export: ExportOptions,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![10, 20, 30, 40, 50],
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            enable_multi_sort: true,
            max_multi_sort: None,
            auto_reset_page_index: false,
            keep_diacritics: false,
            export: ExportOptions::default(),
        }
    }
}

impl TableOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use datatable::TableOptions;
    ///
    /// let options = TableOptions::from_json(r#"{"page_size": 20, "export": {"filename": "users"}}"#).unwrap();
    /// assert_eq!(options.page_size, 20);
    /// assert_eq!(options.debounce_ms, 500);
    /// assert_eq!(options.export.filename, "users");
    /// assert_eq!(options.export.field_separator, ',');
    /// ```
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_multi_sort(mut self, enabled: bool, max: Option<usize>) -> Self {
        self.enable_multi_sort = enabled;
        self.max_multi_sort = max;
        self
    }

    pub fn with_auto_reset_page_index(mut self, enabled: bool) -> Self {
        self.auto_reset_page_index = enabled;
        self
    }

    pub fn with_keep_diacritics(mut self, enabled: bool) -> Self {
        self.keep_diacritics = enabled;
        self
    }

    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            keep_diacritics: self.keep_diacritics,
            ..RankOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TableOptions::default();
        assert_eq!(options.page_size, 10);
        assert_eq!(options.page_size_options, vec![10, 20, 30, 40, 50]);
        assert_eq!(options.debounce(), Duration::from_millis(500));
        assert!(options.enable_multi_sort);
        assert!(!options.auto_reset_page_index);
        assert_eq!(options.export.file_name(), "sample.csv");
        assert!(options.export.use_keys_as_headers);
        assert!(!options.export.use_bom);
    }

    #[test]
    fn test_from_json_partial() {
        let options = TableOptions::from_json(
            r#"{"debounce_ms": 250, "max_multi_sort": 2, "export": {"field_separator": ";", "decimal_separator": ","}}"#,
        )
        .unwrap();
        assert_eq!(options.debounce_ms, 250);
        assert_eq!(options.max_multi_sort, Some(2));
        assert_eq!(options.page_size, 10);
        assert_eq!(options.export.field_separator, ';');
        assert_eq!(options.export.decimal_separator, ",");
        assert!(options.export.quote_strings);

        assert!(TableOptions::from_json("{}").is_ok());
        assert!(TableOptions::from_json(r#"{"page_size": "ten"}"#).is_err());
    }

    #[test]
    fn test_builders() {
        let options = TableOptions::default()
            .with_page_size(25)
            .with_keep_diacritics(true)
            .with_export(ExportOptions::default().with_filename("users.csv"));
        assert_eq!(options.page_size, 25);
        assert!(options.rank_options().keep_diacritics);
        assert_eq!(options.export.file_name(), "users.csv");
    }
}
