/// DataTable CSV Export
///
/// Serializes rows into a CSV blob the host can offer as a download. Field
/// escaping is delegated to the `csv` crate; this module decides which
/// columns appear, how headers are labelled and how numbers are printed.

use crate::column::{format_number, CellValue, ColumnSpec};
use crate::config::ExportOptions;
use crate::error::ExportError;
use crate::table::Row;
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const CSV_MIME_TYPE: &str = "text/csv";

const UTF8_BOM: &str = "\u{feff}";

/// A finished export ready to hand to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub filename: String,
    pub mime_type: &'static str,
    bytes: Vec<u8>,
}

impl ExportBlob {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The CSV text. Blobs are only built from valid UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn ascii_byte(c: char, fallback: u8) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        log::debug!("non-ASCII CSV control character {:?}, using {:?}", c, fallback as char);
        fallback
    }
}

fn format_cell(value: &CellValue, decimal_separator: &str) -> String {
    match value {
        CellValue::Number(n) if decimal_separator != "." => format_number(*n).replace('.', decimal_separator),
        other => other.to_text(),
    }
}

/// Write `rows` as CSV using `columns` in the given order.
///
/// Columns without an accessor (selection checkboxes, action menus) carry no
/// data and are skipped. With no rows the output holds only the header line.
///
/// # Examples
///
/// ```
/// use datatable::{export_csv, ColumnSpec, ExportOptions, Row};
///
/// let columns = vec![ColumnSpec::accessor("name"), ColumnSpec::accessor("age")];
/// let rows = vec![Row::new(1).with("name", "Ann").with("age", 31)];
///
/// let column_refs: Vec<&ColumnSpec> = columns.iter().collect();
/// let row_refs: Vec<&Row> = rows.iter().collect();
/// let blob = export_csv(&column_refs, &row_refs, &ExportOptions::default()).unwrap();
///
/// assert_eq!(blob.filename, "sample.csv");
/// assert_eq!(blob.as_str(), "\"name\",\"age\"\r\n\"Ann\",31\r\n");
/// ```
pub fn export_csv(columns: &[&ColumnSpec], rows: &[&Row], options: &ExportOptions) -> Result<ExportBlob, ExportError> {
    let columns: Vec<&ColumnSpec> = columns.iter().copied().filter(|c| c.has_accessor()).collect();

    let quote_style = if options.quote_strings {
        QuoteStyle::NonNumeric
    } else {
        QuoteStyle::Necessary
    };

    let mut writer = WriterBuilder::new()
        .delimiter(ascii_byte(options.field_separator, b','))
        .quote(ascii_byte(options.quote_character, b'"'))
        .quote_style(quote_style)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    if options.show_column_headers {
        let header = columns.iter().map(|c| {
            if options.use_keys_as_headers {
                c.id().to_string()
            } else {
                c.label().to_string()
            }
        });
        writer.write_record(header)?;
    }

    for row in rows {
        let record = columns
            .iter()
            .map(|c| format_cell(&c.value(row), &options.decimal_separator));
        writer.write_record(record)?;
    }

    let buffer = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(buffer)?;
    if options.use_bom {
        text.insert_str(0, UTF8_BOM);
    }

    log::debug!("exported {} rows x {} columns to {}", rows.len(), columns.len(), options.file_name());

    Ok(ExportBlob {
        filename: options.file_name(),
        mime_type: CSV_MIME_TYPE,
        bytes: text.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::display("select"),
            ColumnSpec::accessor("name").header("Full name"),
            ColumnSpec::accessor("email"),
            ColumnSpec::accessor("score"),
        ]
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new(1).with("name", "Ann").with("email", "a@x.com").with("score", 3.5),
            Row::new(2).with("name", "Bo, Jr.").with("email", "b@x.com").with("score", 7),
        ]
    }

    fn export(options: &ExportOptions) -> ExportBlob {
        let columns = columns();
        let rows = rows();
        let column_refs: Vec<&ColumnSpec> = columns.iter().collect();
        let row_refs: Vec<&Row> = rows.iter().collect();
        export_csv(&column_refs, &row_refs, options).unwrap()
    }

    #[test]
    fn test_export_defaults() {
        let blob = export(&ExportOptions::default());
        assert_eq!(blob.filename, "sample.csv");
        assert_eq!(blob.mime_type, "text/csv");
        assert_eq!(
            blob.as_str(),
            "\"name\",\"email\",\"score\"\r\n\"Ann\",\"a@x.com\",3.5\r\n\"Bo, Jr.\",\"b@x.com\",7\r\n"
        );
    }

    #[test]
    fn test_export_round_trips_through_reader() {
        let options = ExportOptions {
            quote_strings: false,
            ..Default::default()
        };
        let blob = export(&options);

        let mut reader = csv::Reader::from_reader(blob.bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["name", "email", "score"]);

        let records: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(
            records,
            vec![
                vec!["Ann".to_string(), "a@x.com".to_string(), "3.5".to_string()],
                vec!["Bo, Jr.".to_string(), "b@x.com".to_string(), "7".to_string()],
            ]
        );
    }

    #[test]
    fn test_export_labels_and_separators() {
        let options = ExportOptions {
            use_keys_as_headers: false,
            quote_strings: false,
            ..ExportOptions::default()
                .with_field_separator(';')
                .with_decimal_separator(",")
        };
        let text = export(&options).as_str().to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Full name;email;score"));
        assert_eq!(lines.next(), Some("Ann;a@x.com;3,5"));
        assert_eq!(lines.next(), Some("Bo, Jr.;b@x.com;7"));
    }

    #[test]
    fn test_export_without_headers_and_with_bom() {
        let options = ExportOptions {
            show_column_headers: false,
            ..ExportOptions::default().with_bom(true)
        };
        let blob = export(&options);
        assert!(blob.as_str().starts_with("\u{feff}\"Ann\""));
    }

    #[test]
    fn test_export_empty_rows_keeps_header() {
        let columns = columns();
        let column_refs: Vec<&ColumnSpec> = columns.iter().collect();
        let blob = export_csv(&column_refs, &[], &ExportOptions::default()).unwrap();
        assert_eq!(blob.as_str(), "\"name\",\"email\",\"score\"\r\n");
        assert!(!blob.is_empty());
    }

    #[test]
    fn test_computed_columns_export() {
        let columns = vec![ColumnSpec::computed("initial", |row: &Row| {
            CellValue::from(row.get("name").map(|v| v.to_text().chars().take(1).collect::<String>()))
        })];
        let rows = rows();
        let column_refs: Vec<&ColumnSpec> = columns.iter().collect();
        let row_refs: Vec<&Row> = rows.iter().collect();
        let options = ExportOptions {
            quote_strings: false,
            ..Default::default()
        };
        let blob = export_csv(&column_refs, &row_refs, &options).unwrap();
        assert_eq!(blob.as_str(), "initial\r\nA\r\nB\r\n");
    }
}
