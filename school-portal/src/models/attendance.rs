use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::sheet::{FromSheetRow, MalformedRecord, SheetRow};

/// One student's presence on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub student_id: String,
    pub present: bool,
    pub justified: bool,
    pub note: Option<String>,
    pub teacher_id: Option<String>,
}

impl FromSheetRow for AttendanceRecord {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord> {
        Ok(Self {
            date: row.required_date("Date")?,
            student_id: row.required("StudentID")?,
            present: row.flag("Present"),
            justified: row.flag("Justified"),
            note: row.optional("Note"),
            teacher_id: row.optional("TeacherID"),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAttendance {
    #[validate(length(min = 1, message = "Student is required"))]
    pub student_id: String,
    pub date: NaiveDate,
    pub present: bool,
    #[serde(default)]
    pub justified: bool,
    #[validate(length(max = 500, message = "Note is too long"))]
    #[serde(default)]
    pub note: String,
}
