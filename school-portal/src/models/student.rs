use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::sheet::{FromSheetRow, MalformedRecord, SheetRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    /// Foreign key into the parent roster; not checked for existence.
    pub parent_id: String,
    pub class_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_date: Option<NaiveDate>,
}

impl StudentRecord {
    pub fn full_name(&self) -> String {
        super::display_name(&self.first_name, &self.last_name, &self.id)
    }

    /// When the student joined the roster. Rows without a creation date fall
    /// back to the date of birth.
    pub fn added_on(&self) -> Option<NaiveDate> {
        self.created_date.or(self.date_of_birth)
    }
}

impl FromSheetRow for StudentRecord {
    fn from_row(row: &SheetRow) -> Result<Self, MalformedRecord> {
        Ok(Self {
            id: row.required("ID")?,
            parent_id: row.required("ParentID")?,
            class_id: row.optional("ClassID"),
            first_name: row.optional("FirstName"),
            last_name: row.optional("LastName"),
            date_of_birth: row.optional_date("DateOfBirth")?,
            created_date: row.optional_date("CreatedDate")?,
        })
    }
}

/// Registration form for a new student.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudent {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Class is required"))]
    pub class_id: String,
    #[validate(length(min = 1, message = "Parent is required"))]
    pub parent_id: String,
    pub date_of_birth: Option<NaiveDate>,
}
