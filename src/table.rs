//! Delimited table loading and storing
//!
//! Tables are decoded in full with the configured encoding, then parsed with
//! the `csv` crate. Cells are kept as their literal text so that matched rows
//! are written back exactly as they were read.

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use encoding_rs::Encoding;
use std::path::Path;

use crate::encoding::{encode_text, read_text};
use crate::error::{FilterError, Result};
use crate::output::write_file;

/// How a table is laid out on disk
#[derive(Debug, Clone, Copy)]
pub struct TableFormat {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Whether the first record is a header
    pub has_header: bool,
    /// Codec for reading and writing
    pub encoding: &'static Encoding,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// An optional header plus data rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    header: Option<StringRecord>,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn new(header: Option<StringRecord>, rows: Vec<StringRecord>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> Option<&StringRecord> {
        self.header.as_ref()
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Number of data rows (header excluded)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column count, taken from the header or else the first row
    pub fn width(&self) -> usize {
        self.header
            .as_ref()
            .or_else(|| self.rows.first())
            .map_or(0, StringRecord::len)
    }

    /// A table with the same header and the given rows
    pub fn with_rows(&self, rows: Vec<StringRecord>) -> Self {
        Self {
            header: self.header.clone(),
            rows,
        }
    }
}

/// Parse already-decoded text; `path` is only used for error reporting
pub fn parse_table(text: &str, delimiter: u8, has_header: bool, path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| FilterError::Table {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }

    let header = if has_header && !records.is_empty() {
        Some(records.remove(0))
    } else {
        None
    };

    Ok(Table::new(header, records))
}

/// Load a table from disk
pub fn read_table(path: &Path, format: &TableFormat) -> Result<Table> {
    let text = read_text(path, format.encoding)?;
    parse_table(&text, format.delimiter, format.has_header, path)
}

/// Serialize a table to text: header first, `\n` terminated, minimal quoting
pub fn render_table(table: &Table, delimiter: u8, path: &Path) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let to_table_error = |source: csv::Error| FilterError::Table {
        path: path.to_path_buf(),
        source,
    };

    if let Some(header) = table.header() {
        writer.write_record(header).map_err(to_table_error)?;
    }
    for row in table.rows() {
        writer.write_record(row).map_err(to_table_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FilterError::io(path, e.into_error()))?;

    String::from_utf8(bytes).map_err(|e| {
        FilterError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Write a table to disk in the configured encoding
///
/// The whole file is rendered and encoded in memory, then written to a temporary
/// file and renamed over `path`. A failure at any point leaves no partial output.
pub fn write_table(table: &Table, path: &Path, format: &TableFormat) -> Result<()> {
    let text = render_table(table, format.delimiter, path)?;
    let bytes = encode_text(&text, format.encoding, path)?;
    write_file(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fruit_csv() -> &'static str {
        "id,name,description\n\
         1,apple,A red fruit\n\
         2,banana,A yellow fruit\n\
         3,orange,An orange fruit\n"
    }

    #[test]
    fn test_parse_with_header() {
        let table = parse_table(fruit_csv(), b',', true, Path::new("t.csv")).unwrap();

        let header: Vec<&str> = table.header().unwrap().iter().collect();
        assert_eq!(header, vec!["id", "name", "description"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.width(), 3);
        assert_eq!(&table.rows()[1][1], "banana");
    }

    #[test]
    fn test_parse_without_header() {
        let table = parse_table(fruit_csv(), b',', false, Path::new("t.csv")).unwrap();

        assert!(table.header().is_none());
        assert_eq!(table.len(), 4);
        assert_eq!(&table.rows()[0][0], "id");
    }

    #[test]
    fn test_parse_custom_delimiter_and_quotes() {
        let text = "id;note\n1;\"semi;colon\"\n2;\"say \"\"hi\"\"\"\n";
        let table = parse_table(text, b';', true, Path::new("t.csv")).unwrap();

        assert_eq!(&table.rows()[0][1], "semi;colon");
        assert_eq!(&table.rows()[1][1], "say \"hi\"");
    }

    #[test]
    fn test_parse_ragged_rows_fails() {
        let text = "a,b\n1,2\n3\n";
        let err = parse_table(text, b',', true, Path::new("ragged.csv")).unwrap_err();
        assert!(matches!(err, FilterError::Table { .. }));
    }

    #[test]
    fn test_width_of_empty_tables() {
        let table = parse_table("", b',', true, Path::new("t.csv")).unwrap();
        assert_eq!(table.width(), 0);
        assert!(table.header().is_none());

        let table = parse_table("a,b,c\n", b',', true, Path::new("t.csv")).unwrap();
        assert_eq!(table.width(), 3);
        assert!(table.is_empty());
    }

    #[test]
    fn test_render_quotes_when_needed() {
        let table = Table::new(
            Some(StringRecord::from(vec!["id", "text"])),
            vec![StringRecord::from(vec!["1", "a, b"])],
        );
        let text = render_table(&table, b',', Path::new("t.csv")).unwrap();
        assert_eq!(text, "id,text\n1,\"a, b\"\n");
    }

    #[test]
    fn test_write_and_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fruit.csv");
        let format = TableFormat {
            encoding: encoding_rs::SHIFT_JIS,
            ..TableFormat::default()
        };

        let table = Table::new(
            Some(StringRecord::from(vec!["id", "name", "description"])),
            vec![
                StringRecord::from(vec!["1", "りんご", "赤い果物"]),
                StringRecord::from(vec!["3", "orange", "An orange, fruit"]),
            ],
        );

        write_table(&table, &path, &format).unwrap();
        let reloaded = read_table(&path, &format).unwrap();

        assert_eq!(reloaded.header(), table.header());
        assert_eq!(reloaded.len(), table.len());
        for (a, b) in reloaded.rows().iter().zip(table.rows()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_write_unmappable_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let format = TableFormat {
            encoding: encoding_rs::WINDOWS_1252,
            ..TableFormat::default()
        };

        let table = Table::new(None, vec![StringRecord::from(vec!["日本"])]);
        let err = write_table(&table, &path, &format).unwrap_err();

        assert!(matches!(err, FilterError::Encode { .. }));
        assert!(!path.exists());
    }
}
