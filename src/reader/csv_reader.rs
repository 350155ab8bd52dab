use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::models::RawRecord;

/// Rows of one source file, as read.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
    pub skipped_rows: usize,
}

/// Permissive CSV reader: undecodable bytes fall back to Latin-1 and
/// malformed rows are dropped instead of failing the file.
pub struct SourceReader {
    na_values: HashSet<String>,
}

impl SourceReader {
    pub fn new(na_values: &[String]) -> Self {
        SourceReader {
            na_values: na_values.iter().cloned().collect(),
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<RawTable> {
        let file = File::open(path).map_err(|source| PipelineError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let table = self.read_from(file).map_err(|source| PipelineError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

        if table.skipped_rows > 0 {
            warn!(
                "Skipped {} malformed rows in {}",
                table.skipped_rows,
                path.display()
            );
        }
        info!(
            "Read {} rows ({} columns) from {}",
            table.rows.len(),
            table.headers.len(),
            path.display()
        );

        Ok(table)
    }

    /// Only I/O failures are returned; every other CSV error skips the row.
    pub fn read_from<R: Read>(&self, input: R) -> std::result::Result<RawTable, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let header = decode_field(header);
                if index == 0 {
                    header.trim_start_matches('\u{feff}').to_string()
                } else {
                    header.into_owned()
                }
            })
            .collect();

        let mut table = RawTable {
            headers,
            ..Default::default()
        };
        let mut record = ByteRecord::new();

        loop {
            match reader.read_byte_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e),
                Err(e) => {
                    table.skipped_rows += 1;
                    debug!("Skipping unreadable row: {}", e);
                    continue;
                }
            }

            // Short rows are padded with missing cells; long rows are malformed.
            if record.len() > table.headers.len() {
                table.skipped_rows += 1;
                debug!(
                    "Skipping row at line {:?}: {} fields, expected {}",
                    record.position().map(|p| p.line()),
                    record.len(),
                    table.headers.len()
                );
                continue;
            }

            table.rows.push(self.to_raw_record(&table.headers, &record));
        }

        Ok(table)
    }

    fn to_raw_record(&self, headers: &[String], record: &ByteRecord) -> RawRecord {
        let mut raw = RawRecord::with_capacity(record.len());

        for (header, field) in headers.iter().zip(record.iter()) {
            let value = decode_field(field);
            if self.is_missing(&value) {
                continue;
            }
            // Duplicate headers: first column wins
            raw.entry(header.clone()).or_insert_with(|| value.into_owned());
        }

        raw
    }

    fn is_missing(&self, value: &str) -> bool {
        self.na_values.contains(value.trim())
    }
}

fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reader() -> SourceReader {
        SourceReader::new(&["".to_string(), "N/A".to_string(), "nan".to_string()])
    }

    #[test]
    fn test_reads_rows_keyed_by_header() {
        let csv = "Product Name,Price,Brand\nPhone X,\"₹10,000\",Acme\nPhone Y,\"9,500\",Globex\n";
        let table = reader().read_from(csv.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Product Name", "Price", "Brand"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Price"], "₹10,000");
        assert_eq!(table.rows[1]["Brand"], "Globex");
        assert_eq!(table.skipped_rows, 0);
    }

    #[test]
    fn test_latin1_bytes_are_decoded_permissively() {
        let mut bytes = b"Product,Selling Price\n".to_vec();
        bytes.extend_from_slice(b"Caf\xe9 Speaker,1299\n");

        let table = reader().read_from(bytes.as_slice()).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["Product"], "Café Speaker");
    }

    #[test]
    fn test_long_rows_are_skipped_and_short_rows_padded() {
        let csv = "Product,Selling Price,Brand\n\
                   Laptop A,45000,Lenovo\n\
                   Laptop B,50000,HP,extra,cells\n\
                   Laptop C,47000\n";
        let table = reader().read_from(csv.as_bytes()).unwrap();

        assert_eq!(table.skipped_rows, 1);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["Product"], "Laptop C");
        assert!(!table.rows[1].contains_key("Brand"));
    }

    #[test]
    fn test_missing_tokens_become_absent_cells() {
        let csv = "Product,Selling Price,Brand\nEarbuds,N/A,  \nHeadset,999,nan\n";
        let table = reader().read_from(csv.as_bytes()).unwrap();

        assert!(!table.rows[0].contains_key("Selling Price"));
        assert!(!table.rows[0].contains_key("Brand"));
        assert!(!table.rows[1].contains_key("Brand"));
        assert_eq!(table.rows[1]["Selling Price"], "999");
    }

    #[test]
    fn test_bom_is_stripped_from_first_header() {
        let csv = "\u{feff}Product Name,Price\nTV,30000\n";
        let table = reader().read_from(csv.as_bytes()).unwrap();

        assert_eq!(table.headers[0], "Product Name");
        assert_eq!(table.rows[0]["Product Name"], "TV");
    }

    #[test]
    fn test_read_path_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Product Name,Price,Brand").unwrap();
        writeln!(file, "Tablet,\"₹1,23,456\",Samsung").unwrap();

        let table = reader().read_path(file.path()).unwrap();
        assert_eq!(table.rows[0]["Price"], "₹1,23,456");
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = reader()
            .read_path(&dir.path().join("croma.csv"))
            .unwrap_err();

        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
    }
}
