use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::{IngestError, Result};
use crate::options::CleaningOptions;

const UTF8_BOM: char = '\u{feff}';

/// Delimited table exactly as read: a header row plus text cells.
///
/// Short records are padded with empty cells so every row has one cell
/// per header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Read a delimited response file from disk.
pub fn read_csv(path: &Path, options: &CleaningOptions) -> Result<RawTable> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let raw = read_csv_from_reader(file, options)?;
    debug!(
        event = "input_read",
        path = %path.display(),
        rows = raw.row_count(),
        columns = raw.column_count()
    );
    Ok(raw)
}

/// Read a delimited response table from any reader.
pub fn read_csv_from_reader<R: Read>(reader: R, options: &CleaningOptions) -> Result<RawTable> {
    options.validate()?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter_byte()?)
        .flexible(true)
        .from_reader(reader);

    let mut headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix(UTF8_BOM) {
            *first = stripped.to_string();
        }
    }
    if headers.is_empty() {
        return Err(IngestError::InvalidInput(
            "input has no header row".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(IngestError::InvalidInput(format!(
                "row {} has {} fields, header has {}",
                idx + 1,
                record.len(),
                headers.len()
            )));
        }
        let mut row = record.iter().map(|cell| cell.to_string()).collect::<Vec<_>>();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<RawTable> {
        read_csv_from_reader(input.as_bytes(), &CleaningOptions::default())
    }

    #[test]
    fn reads_headers_and_pads_short_rows() {
        let raw = read("a,b,c\n1,2,3\n4,5\n").expect("read");

        assert_eq!(raw.headers, vec!["a", "b", "c"]);
        assert_eq!(raw.rows[1], vec!["4", "5", ""]);
    }

    #[test]
    fn strips_byte_order_mark() {
        let raw = read("\u{feff}q1,q2\n1,2\n").expect("read");
        assert_eq!(raw.headers[0], "q1");
    }

    #[test]
    fn rejects_rows_longer_than_header() {
        let err = read("a,b\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("row 1 has 3 fields"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(read(""), Err(IngestError::InvalidInput(_))));
    }

    #[test]
    fn honours_custom_delimiter() {
        let options = CleaningOptions {
            delimiter: ';',
            ..CleaningOptions::default()
        };
        let raw = read_csv_from_reader("a;b\n1;2\n".as_bytes(), &options).expect("read");
        assert_eq!(raw.headers, vec!["a", "b"]);
        assert_eq!(raw.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }
}
