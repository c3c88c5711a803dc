//! Reference table loading
//!
//! The table is delimited text with a header row. It is re-read on every
//! matching pass so operator edits take effect without a restart; nothing
//! is cached between passes.

use crate::error::MatchError;
use std::path::Path;

/// Columns every reference table must declare, in any order and case
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "description", "amount", "total"];

/// One data row, fields kept opaque for the oracle to interpret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    /// Raw field values in header order
    pub fields: Vec<String>,
}

impl ReferenceRow {
    /// Re-join the fields with the table's delimiter, for the
    /// `_matched_row.txt` companion file
    pub fn raw(&self, delimiter: char) -> String {
        self.fields.join(&delimiter.to_string())
    }
}

/// A loaded reference table: header plus ordered data rows
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    headers: Vec<String>,
    rows: Vec<ReferenceRow>,
    delimiter: u8,
}

impl ReferenceTable {
    /// Load and validate a table from a delimited file
    ///
    /// Fails if the file is unreadable, not parseable with the given
    /// delimiter, or its header is missing any of [`REQUIRED_COLUMNS`].
    /// Extra columns pass through untouched. Zero data rows is NOT an
    /// error: an empty table is present-but-never-matches.
    pub fn load(path: &Path, delimiter: u8) -> Result<Self, MatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(|e| MatchError::Table(format!("{}: {}", path.display(), e)))?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        for required in REQUIRED_COLUMNS {
            if !headers
                .iter()
                .any(|h| h.trim().eq_ignore_ascii_case(required))
            {
                return Err(MatchError::Table(format!(
                    "missing required column '{}' in {}",
                    required,
                    path.display()
                )));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(ReferenceRow {
                fields: record.iter().map(|f| f.to_string()).collect(),
            });
        }

        Ok(Self {
            headers,
            rows,
            delimiter,
        })
    }

    /// Number of data rows (header excluded)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by the oracle's 1-based row number
    pub fn row(&self, number: usize) -> Option<&ReferenceRow> {
        number.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }

    /// The delimiter this table was parsed with
    pub fn delimiter(&self) -> char {
        self.delimiter as char
    }

    /// Serialize header and numbered rows for the `{match_data}` slot
    ///
    /// Rows carry their 1-based number so the oracle can name one back.
    pub fn render(&self) -> String {
        let delim = self.delimiter().to_string();
        let mut out = self.headers.join(&delim);
        for (idx, row) in self.rows.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{}: {}", idx + 1, row.fields.join(&delim)));
        }
        out
    }
}
