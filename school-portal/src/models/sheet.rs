//! Raw spreadsheet rows and the typed-record boundary.
//!
//! A sheet is a header line followed by value lines. Each value line becomes a
//! [`SheetRow`] keyed by header; typed records are built from it with
//! [`FromSheetRow`], which rejects rows missing a required field.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// A row that does not fit its record schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record in sheet '{sheet}' at row {row}: field '{field}' {reason}")]
pub struct MalformedRecord {
    pub sheet: String,
    /// Spreadsheet line number; the header is line 1.
    pub row: usize,
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    sheet: String,
    line: usize,
    cells: HashMap<String, String>,
}

impl SheetRow {
    pub fn new(sheet: impl Into<String>, line: usize, cells: HashMap<String, String>) -> Self {
        Self {
            sheet: sheet.into(),
            line,
            cells,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn malformed(&self, field: &str, reason: impl Into<String>) -> MalformedRecord {
        MalformedRecord {
            sheet: self.sheet.clone(),
            row: self.line,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Trimmed, non-empty value of `field`.
    pub fn optional(&self, field: &str) -> Option<String> {
        self.cells
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    pub fn required(&self, field: &str) -> Result<String, MalformedRecord> {
        match self.cells.get(field) {
            None => Err(self.malformed(field, "is missing")),
            Some(v) if v.trim().is_empty() => Err(self.malformed(field, "is empty")),
            Some(v) => Ok(v.trim().to_string()),
        }
    }

    /// Spreadsheet booleans are the literal text `true`; anything else is false.
    pub fn flag(&self, field: &str) -> bool {
        self.optional(field)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn required_date(&self, field: &str) -> Result<NaiveDate, MalformedRecord> {
        let raw = self.required(field)?;
        parse_date(&raw).ok_or_else(|| self.malformed(field, format!("is not a date: {:?}", raw)))
    }

    /// Blank is `None`; a value that is not a date is malformed.
    pub fn optional_date(&self, field: &str) -> Result<Option<NaiveDate>, MalformedRecord> {
        self.optional(field)
            .map(|raw| {
                parse_date(&raw)
                    .ok_or_else(|| self.malformed(field, format!("is not a date: {:?}", raw)))
            })
            .transpose()
    }

    pub fn required_timestamp(&self, field: &str) -> Result<DateTime<Utc>, MalformedRecord> {
        let raw = self.required(field)?;
        parse_timestamp(&raw)
            .ok_or_else(|| self.malformed(field, format!("is not a timestamp: {:?}", raw)))
    }

    pub fn required_number(&self, field: &str) -> Result<f64, MalformedRecord> {
        let raw = self.required(field)?;
        // Sheets formatted for French locales use a decimal comma.
        raw.replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.malformed(field, format!("is not a number: {:?}", raw)))
    }
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, or the date part of an RFC 3339
/// timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

/// Accepts RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}

/// Build a typed record from one spreadsheet row.
pub trait FromSheetRow: Sized {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord>;
}

/// Split raw sheet values into header-keyed rows.
///
/// Cells missing at the end of a short row read as empty. Rows whose cells
/// are all blank are skipped.
pub fn parse_sheet_values(sheet: &str, values: &[Vec<String>]) -> Vec<SheetRow> {
    let Some((headers, rows)) = values.split_first() else {
        return Vec::new();
    };
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(index, row)| {
            let cells = headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect();
            // +2: one for the header line, one for 1-based numbering.
            SheetRow::new(sheet, index + 2, cells)
        })
        .collect()
}

pub fn records_from_values<T: FromSheetRow>(
    sheet: &str,
    values: &[Vec<String>],
) -> Result<Vec<T>, MalformedRecord> {
    parse_sheet_values(sheet, values)
        .iter()
        .map(T::from_row)
        .collect()
}
