use serde::{Deserialize, Serialize};

use super::sheet::{FromSheetRow, MalformedRecord, SheetRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: String,
    pub name: Option<String>,
    pub level: Option<String>,
    pub teacher_id: Option<String>,
}

impl FromSheetRow for ClassRecord {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord> {
        Ok(Self {
            id: row.required("ID")?,
            name: row.optional("Name"),
            level: row.optional("Level"),
            teacher_id: row.optional("TeacherID"),
        })
    }
}
