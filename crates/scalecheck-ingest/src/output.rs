use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::clean::CleanedTable;
use crate::errors::Result;

/// Write the cleaned table as comma-separated text; returns bytes written.
///
/// Absent answers are written as empty cells so the file reloads to the
/// same table.
pub fn write_cleaned_csv(path: &Path, table: &CleanedTable) -> Result<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let counting = CountingWriter::new(BufWriter::new(File::create(path)?));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    let raw = table.to_raw();
    writer.write_record(&raw.headers)?;
    for row in &raw.rows {
        writer.write_record(row)?;
    }

    writer.flush()?;
    let mut counting = writer.into_inner().map_err(|err| err.into_error())?;
    counting.flush()?;
    let bytes = counting.bytes_written();

    info!(
        event = "cleaned_file_written",
        path = %path.display(),
        rows = raw.rows.len(),
        bytes = bytes
    );
    Ok(bytes)
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
