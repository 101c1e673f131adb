use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sheet::{FromSheetRow, MalformedRecord, SheetRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub student_id: String,
    pub subject: String,
    pub grade: f64,
    pub date: DateTime<Utc>,
    pub comment: Option<String>,
    pub teacher_id: Option<String>,
}

impl FromSheetRow for GradeRecord {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord> {
        Ok(Self {
            student_id: row.required("StudentID")?,
            subject: row.required("Subject")?,
            grade: row.required_number("Grade")?,
            date: row.required_timestamp("Date")?,
            comment: row.optional("Comment"),
            teacher_id: row.optional("TeacherID"),
        })
    }
}
