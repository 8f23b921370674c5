//! Tab-separated input parsing.

use super::{Gender, Residency};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

const REQUIRED_COLUMNS: [&str; 6] = ["visits", "complaints", "residency", "gender", "revenue", "hours"];

/// Errors raised while reading the input table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input has no header row")]
    MissingHeader,

    #[error("required column '{0}' not found in header")]
    MissingColumn(String),

    #[error("line {line}: expected at least {expected} fields, got {got}")]
    ShortRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("line {line}: unknown level '{value}' for column '{column}'")]
    UnknownLevel {
        line: usize,
        column: String,
        value: String,
    },
}

/// A parsed row before cleaning. Counts may still be negative here.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub visits: i64,
    pub complaints: i64,
    pub residency: Residency,
    pub gender: Gender,
    pub revenue: f64,
    pub hours: f64,
}

/// Load a tab-separated file with a header row.
pub fn load_tsv<P: AsRef<Path>>(path: P) -> Result<Vec<RawObservation>, DataError> {
    let file = File::open(path.as_ref())?;
    let rows = parse_tsv(file)?;
    log::debug!("read {} rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}

/// Parse tab-separated text with a header row.
///
/// Columns are located by (case-insensitive) name; extra columns are ignored
/// and blank lines skipped.
pub fn parse_tsv<R: Read>(reader: R) -> Result<Vec<RawObservation>, DataError> {
    let mut lines = BufReader::new(reader).lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(DataError::MissingHeader),
        }
    };

    let names: Vec<String> = header
        .split('\t')
        .map(|h| h.trim().trim_matches('"').to_ascii_lowercase())
        .collect();

    let mut index = [0usize; 6];
    for (slot, required) in index.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = names
            .iter()
            .position(|n| n == required)
            .ok_or_else(|| DataError::MissingColumn(required.to_string()))?;
    }
    let needed = index.iter().max().map_or(0, |&m| m + 1);

    let mut rows = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line?;
        // header is line 1
        let line_no = offset + 2;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line
            .split('\t')
            .map(|f| f.trim().trim_matches('"'))
            .collect();
        if fields.len() < needed {
            return Err(DataError::ShortRow {
                line: line_no,
                expected: needed,
                got: fields.len(),
            });
        }

        let [visits, complaints, residency, gender, revenue, hours] = index;
        rows.push(RawObservation {
            visits: parse_count(fields[visits], line_no, "visits")?,
            complaints: parse_count(fields[complaints], line_no, "complaints")?,
            residency: Residency::parse_label(fields[residency]).ok_or_else(|| {
                DataError::UnknownLevel {
                    line: line_no,
                    column: "residency".to_string(),
                    value: fields[residency].to_string(),
                }
            })?,
            gender: Gender::parse_label(fields[gender]).ok_or_else(|| DataError::UnknownLevel {
                line: line_no,
                column: "gender".to_string(),
                value: fields[gender].to_string(),
            })?,
            revenue: parse_real(fields[revenue], line_no, "revenue")?,
            hours: parse_real(fields[hours], line_no, "hours")?,
        });
    }

    Ok(rows)
}

fn invalid(value: &str, line: usize, column: &str) -> DataError {
    DataError::InvalidValue {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Integer counts; integral floats such as `12.0` are accepted when they fit
/// in an `i64`.
fn parse_count(value: &str, line: usize, column: &str) -> Result<i64, DataError> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    let in_range = |v: f64| v >= i64::MIN as f64 && v < i64::MAX as f64;
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && in_range(v) => Ok(v as i64),
        _ => Err(invalid(value, line, column)),
    }
}

fn parse_real(value: &str, line: usize, column: &str) -> Result<f64, DataError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(value, line, column)),
    }
}
