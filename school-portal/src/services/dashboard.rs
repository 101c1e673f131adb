//! Landing-page summaries for staff and parents.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{
    AttendanceRecord, ClassRecord, GradeRecord, MessageRecord, RoleAssignment, StudentRecord,
};
use crate::services::school::{
    attendance_stats, grade_average, student_attendance, student_grades, unread_count,
    user_messages, AttendanceStats,
};
use crate::services::{RosterError, SchoolService, UserSession};

const RECENT_MESSAGES: usize = 10;
const RECENT_ATTENDANCE: usize = 7;
const RECENT_GRADES: usize = 5;
const STATS_WINDOW_DAYS: i64 = 30;
const RECENT_ACTIVITY: usize = 5;
const ACTIVITY_MESSAGES: usize = 3;
const ACTIVITY_NEW_STUDENTS: usize = 2;
const NEW_STUDENT_DAYS: i64 = 7;

/// One line of the staff activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    Message {
        message_id: String,
        sender_id: String,
        date: DateTime<Utc>,
    },
    NewStudent {
        student_id: String,
        name: String,
        added_on: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffDashboard {
    pub total_students: usize,
    pub total_classes: usize,
    pub total_teachers: usize,
    pub total_parents: usize,
    /// Whole percent of students marked present today.
    pub attendance_rate_today: u32,
    pub unread_messages: usize,
    pub recent_messages: Vec<MessageRecord>,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildOverview {
    pub student: StudentRecord,
    pub class: Option<ClassRecord>,
    pub attendance_stats: AttendanceStats,
    pub recent_attendance: Vec<AttendanceRecord>,
    pub recent_grades: Vec<GradeRecord>,
    pub grade_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentDashboard {
    pub children: Vec<ChildOverview>,
    pub unread_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Dashboard {
    Staff(StaffDashboard),
    Parent(ParentDashboard),
}

/// Present-today share of all students, rounded to a whole percent.
fn attendance_rate_on(records: &[AttendanceRecord], day: NaiveDate, total_students: usize) -> u32 {
    if total_students == 0 {
        return 0;
    }
    let present = records.iter().filter(|r| r.date == day && r.present).count();
    (present as f64 / total_students as f64 * 100.0).round() as u32
}

/// The newest messages, then students added in the last week, in roster
/// order.
fn recent_activity(
    recent_messages: &[MessageRecord],
    students: &[StudentRecord],
    today: NaiveDate,
) -> Vec<Activity> {
    let since = today - Duration::days(NEW_STUDENT_DAYS);

    let messages = recent_messages
        .iter()
        .take(ACTIVITY_MESSAGES)
        .map(|m| Activity::Message {
            message_id: m.id.clone(),
            sender_id: m.sender_id.clone(),
            date: m.date,
        });

    let new_students = students
        .iter()
        .filter_map(|s| s.added_on().filter(|day| *day > since).map(|day| (s, day)))
        .take(ACTIVITY_NEW_STUDENTS)
        .map(|(s, added_on)| Activity::NewStudent {
            student_id: s.id.clone(),
            name: s.full_name(),
            added_on,
        });

    messages.chain(new_students).take(RECENT_ACTIVITY).collect()
}

fn child_overview(
    student: StudentRecord,
    classes: &[ClassRecord],
    attendance: &[AttendanceRecord],
    grades: &[GradeRecord],
    today: NaiveDate,
) -> ChildOverview {
    let class = student
        .class_id
        .as_deref()
        .and_then(|id| classes.iter().find(|c| c.id == id))
        .cloned();

    let window_start = today - Duration::days(STATS_WINDOW_DAYS);
    let mut recent_grades = student_grades(grades, &student.id);
    recent_grades.truncate(RECENT_GRADES);

    ChildOverview {
        class,
        attendance_stats: attendance_stats(attendance, &student.id, window_start, today),
        recent_attendance: student_attendance(attendance, &student.id, RECENT_ATTENDANCE),
        recent_grades,
        grade_average: grade_average(grades, &student.id, None),
        student,
    }
}

impl SchoolService {
    pub async fn staff_dashboard(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<StaffDashboard, RosterError> {
        let roster = self.roster();
        let (students, classes, teachers, parents, attendance, messages) = tokio::try_join!(
            roster.students(),
            roster.classes(),
            roster.teachers(),
            roster.parents(),
            roster.attendance(),
            roster.messages(),
        )?;

        let recent_messages = user_messages(&messages, user_id, RECENT_MESSAGES);

        Ok(StaffDashboard {
            total_students: students.len(),
            total_classes: classes.len(),
            total_teachers: teachers.len(),
            total_parents: parents.len(),
            attendance_rate_today: attendance_rate_on(&attendance, today, students.len()),
            unread_messages: unread_count(&messages, user_id),
            recent_activity: recent_activity(&recent_messages, &students, today),
            recent_messages,
        })
    }

    /// Overview of each child, in the order the session lists them.
    pub async fn parent_dashboard(
        &self,
        parent_id: &str,
        children: &[StudentRecord],
        today: NaiveDate,
    ) -> Result<ParentDashboard, RosterError> {
        let roster = self.roster();
        let (classes, attendance, grades, messages) = tokio::try_join!(
            roster.classes(),
            roster.attendance(),
            roster.grades(),
            roster.messages(),
        )?;

        let children = children
            .iter()
            .cloned()
            .map(|student| child_overview(student, &classes, &attendance, &grades, today))
            .collect();

        Ok(ParentDashboard {
            children,
            unread_messages: unread_count(&messages, parent_id),
        })
    }

    /// Class, recent records and 30-day statistics for one student.
    pub async fn student_overview(
        &self,
        student: StudentRecord,
        today: NaiveDate,
    ) -> Result<ChildOverview, RosterError> {
        let roster = self.roster();
        let (classes, attendance, grades) =
            tokio::try_join!(roster.classes(), roster.attendance(), roster.grades())?;

        Ok(child_overview(student, &classes, &attendance, &grades, today))
    }

    /// Pick the dashboard for the session's role. `None` for unrecognised
    /// accounts.
    #[tracing::instrument(skip_all, fields(role = ?session.assignment.kind()))]
    pub async fn dashboard_for(
        &self,
        session: &UserSession,
        today: NaiveDate,
    ) -> Result<Option<Dashboard>, RosterError> {
        let dashboard = match &session.assignment {
            RoleAssignment::Admin => {
                let user_id = session.identity.folded_email();
                Dashboard::Staff(self.staff_dashboard(&user_id, today).await?)
            }
            RoleAssignment::Teacher { teacher } => {
                Dashboard::Staff(self.staff_dashboard(&teacher.id, today).await?)
            }
            RoleAssignment::Parent { parent, children } => {
                Dashboard::Parent(self.parent_dashboard(&parent.id, children, today).await?)
            }
            RoleAssignment::Unknown => return Ok(None),
        };
        Ok(Some(dashboard))
    }
}
