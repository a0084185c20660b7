//! Newline-delimited JSON export files.
//!
//! Used both for flat user exports and for credential exports carrying
//! password hashes. Blank lines are skipped; lines that are not UTF-8 JSON
//! objects are reported back instead of aborting the read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ferry_core::RawRecord;
use serde_json::Value;

use crate::error::SourceError;

/// Records read from one export file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExportFile {
    pub records: Vec<RawRecord>,
    /// `line N: reason` for every line that could not be decoded.
    pub malformed: Vec<String>,
}

/// Read an NDJSON export file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be opened or read.
pub fn read_export(path: &Path) -> Result<ExportFile, SourceError> {
    let io_error = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut export = ExportFile::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(io_error)? == 0 {
            break;
        }
        line_no += 1;
        let bytes = buf.strip_suffix(b"\n").unwrap_or(buf.as_slice());
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        let Ok(line) = std::str::from_utf8(bytes) else {
            tracing::warn!(line = line_no, "export line is not valid UTF-8; skipping");
            export
                .malformed
                .push(format!("line {line_no}: invalid UTF-8"));
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => export.records.push(record),
            Ok(_) => {
                tracing::warn!(line = line_no, "export line is not a JSON object; skipping");
                export
                    .malformed
                    .push(format!("line {line_no}: not a JSON object"));
            }
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "export line is not valid JSON; skipping");
                export.malformed.push(format!("line {line_no}: {e}"));
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        records = export.records.len(),
        malformed = export.malformed.len(),
        "loaded export file"
    );
    Ok(export)
}
