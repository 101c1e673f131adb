pub mod attendance;
pub mod class;
pub mod grade;
pub mod identity;
pub mod message;
pub mod parent;
pub mod role;
pub mod sheet;
pub mod student;
pub mod teacher;

pub use attendance::{AttendanceRecord, NewAttendance};
pub use class::ClassRecord;
pub use grade::GradeRecord;
pub use identity::Identity;
pub use message::{MessageRecord, NewMessage};
pub use parent::ParentRecord;
pub use role::{RoleAssignment, RoleKind};
pub use sheet::{FromSheetRow, MalformedRecord, SheetRow};
pub use student::{NewStudent, StudentRecord};
pub use teacher::TeacherRecord;

/// "First Last" from whichever name parts are present, or `fallback`.
fn display_name(first: &Option<String>, last: &Option<String>, fallback: &str) -> String {
    let name = [first.as_deref(), last.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        fallback.to_string()
    } else {
        name
    }
}
