use serde::{Deserialize, Serialize};

use super::sheet::{FromSheetRow, MalformedRecord, SheetRow};

/// A row of the parent roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl ParentRecord {
    pub fn has_email(&self, folded_email: &str) -> bool {
        self.email.trim().to_lowercase() == folded_email
    }

    pub fn display_name(&self) -> String {
        super::display_name(&self.first_name, &self.last_name, &self.email)
    }
}

impl FromSheetRow for ParentRecord {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord> {
        Ok(Self {
            id: row.required("ID")?,
            email: row.required("Email")?,
            first_name: row.optional("FirstName"),
            last_name: row.optional("LastName"),
            phone: row.optional("Phone"),
        })
    }
}
