//! Record source: reads the quiz sheet and builds entries.
//!
//! The sheet is a comma-separated file whose first row is a header. Each
//! following row becomes one [`Entry`]. Loading is all-or-nothing: a
//! malformed row stops the load before anything is dispatched, except rows
//! with an unknown kind which are skipped.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Entry, RecordError};

/// Errors from reading the record source.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read record: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {source}")]
    InvalidRecord {
        line: u64,
        #[source]
        source: RecordError,
    },
}

/// Result type for sheet loading.
pub type SheetResult<T> = Result<T, SheetError>;

/// One raw row with its position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number of the row.
    pub line: u64,
    pub fields: Vec<String>,
}

/// A row that was not turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: u64,
    pub reason: RecordError,
}

/// Entries loaded from a sheet, in input order.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub entries: Vec<Entry>,
    pub skipped: Vec<SkippedRecord>,
}

/// Read all data rows (header skipped) from a reader.
pub fn read_records<R: io::Read>(reader: R) -> SheetResult<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push(RawRecord {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(records)
}

/// Turn raw rows into entries, preserving order.
pub fn build_sheet(records: Vec<RawRecord>) -> SheetResult<Sheet> {
    let mut sheet = Sheet::default();
    for record in records {
        match Entry::from_record(&record.fields) {
            Ok(entry) => sheet.entries.push(entry),
            Err(reason) if reason.is_skippable() => {
                tracing::warn!("Skipping line {}: {}", record.line, reason);
                sheet.skipped.push(SkippedRecord {
                    line: record.line,
                    reason,
                });
            }
            Err(source) => {
                return Err(SheetError::InvalidRecord {
                    line: record.line,
                    source,
                })
            }
        }
    }
    Ok(sheet)
}

/// Load a sheet from a file.
pub fn load_sheet(path: &Path) -> SheetResult<Sheet> {
    let file = std::fs::File::open(path).map_err(|source| SheetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(file)?;
    tracing::debug!("Read {} records from {}", records.len(), path.display());
    build_sheet(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "n,question,type,title,urls,qstart,qlen,astart,alen,speed\n";

    #[test]
    fn skips_header_and_keeps_order() {
        let data = format!(
            "{}x,7,normal,Test Song,http://a | http://b,0,5,10,5,\nx,8,slow,\"Other, Song\",http://c,1,2,3,4,0.5\n",
            HEADER
        );
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields[1], "7");
        assert_eq!(records[1].fields[3], "Other, Song");
        assert_eq!(records[0].line, 2);
    }

    #[test]
    fn builds_entries() {
        let data = format!("{}x,7,normal,Test Song,http://a | http://b,0,5,10,5,\n", HEADER);
        let sheet = build_sheet(read_records(data.as_bytes()).unwrap()).unwrap();
        assert_eq!(sheet.entries.len(), 1);
        assert_eq!(
            sheet.entries[0].kind(),
            &EntryKind::Normal {
                source: "http://a".into()
            }
        );
    }

    #[test]
    fn unknown_kind_rows_are_skipped() {
        let data = format!(
            "{}x,1,karaoke,A,http://a,0,5,10,5,\nx,2,normal,B,http://b,0,5,10,5,\n",
            HEADER
        );
        let sheet = build_sheet(read_records(data.as_bytes()).unwrap()).unwrap();
        assert_eq!(sheet.entries.len(), 1);
        assert_eq!(sheet.skipped.len(), 1);
        assert_eq!(sheet.skipped[0].line, 2);
    }

    #[test]
    fn trailing_blank_rows_are_skipped() {
        let data = format!(
            "{}x,7,normal,Test Song,http://a,0,5,10,5,\n,,,,,,,,,\n,,,,,,,,,\n",
            HEADER
        );
        let sheet = build_sheet(read_records(data.as_bytes()).unwrap()).unwrap();
        assert_eq!(sheet.entries.len(), 1);
        assert_eq!(sheet.skipped.len(), 2);
        assert_eq!(sheet.skipped[0].line, 3);
        assert_eq!(sheet.skipped[0].reason, RecordError::UnknownKind(String::new()));
    }

    #[test]
    fn short_row_fails_whole_load() {
        let data = format!("{}x,1,normal,A,http://a,0,5,10,5,\nx,2,normal\n", HEADER);
        let err = build_sheet(read_records(data.as_bytes()).unwrap()).unwrap_err();
        match err {
            SheetError::InvalidRecord { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, RecordError::TooFewFields { found: 3, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_sheet_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_sheet(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, SheetError::Open { .. }));
    }

    #[test]
    fn load_sheet_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quiz.csv");
        fs::write(&path, format!("{}x,3,fast,Song,http://a,0,5,10,5,1.5\n", HEADER)).unwrap();

        let sheet = load_sheet(&path).unwrap();
        assert_eq!(sheet.entries[0].index().as_str(), "03");
    }
}
