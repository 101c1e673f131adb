//! The roster collaborator: bulk access to the school's record collections.

use async_trait::async_trait;

use crate::models::{
    AttendanceRecord, ClassRecord, GradeRecord, MessageRecord, NewAttendance, NewMessage,
    NewStudent, ParentRecord, StudentRecord, TeacherRecord,
};
use crate::services::RosterError;

/// Fetch-all access to each record collection.
///
/// Sources do no server-side filtering; callers filter after full retrieval.
/// The write operations default to [`RosterError::NotSupported`] so that a
/// source without a write path fails loudly instead of pretending success.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn teachers(&self) -> Result<Vec<TeacherRecord>, RosterError>;

    async fn parents(&self) -> Result<Vec<ParentRecord>, RosterError>;

    async fn students(&self) -> Result<Vec<StudentRecord>, RosterError>;

    async fn classes(&self) -> Result<Vec<ClassRecord>, RosterError>;

    async fn attendance(&self) -> Result<Vec<AttendanceRecord>, RosterError>;

    async fn grades(&self) -> Result<Vec<GradeRecord>, RosterError>;

    async fn messages(&self) -> Result<Vec<MessageRecord>, RosterError>;

    async fn add_message(
        &self,
        _sender_id: &str,
        _message: &NewMessage,
    ) -> Result<MessageRecord, RosterError> {
        Err(RosterError::NotSupported("add_message"))
    }

    async fn mark_message_read(&self, _message_id: &str) -> Result<(), RosterError> {
        Err(RosterError::NotSupported("mark_message_read"))
    }

    async fn add_attendance(
        &self,
        _teacher_id: Option<&str>,
        _record: &NewAttendance,
    ) -> Result<AttendanceRecord, RosterError> {
        Err(RosterError::NotSupported("add_attendance"))
    }

    async fn register_student(&self, _student: &NewStudent) -> Result<StudentRecord, RosterError> {
        Err(RosterError::NotSupported("register_student"))
    }
}
