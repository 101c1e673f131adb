//! Read-side queries over the rosters.
//!
//! Each query fetches whole collections and filters in memory.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    AttendanceRecord, ClassRecord, GradeRecord, MessageRecord, ParentRecord, RoleAssignment,
    RoleKind, StudentRecord, TeacherRecord,
};
use crate::services::access::can_message;
use crate::services::{RosterError, RosterSource};

pub const DEFAULT_ATTENDANCE_LIMIT: usize = 30;
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;
pub const DEFAULT_CONVERSATION_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub justified_absences: usize,
    /// Percentage present, one decimal; `None` when there are no records.
    pub attendance_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub participant_id: String,
    pub participant_name: Option<String>,
    pub participant_role: Option<RoleKind>,
    pub last_message: MessageRecord,
    pub unread_count: usize,
    /// Oldest first.
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub role: RoleKind,
    pub email: String,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Attendance totals for one student between `start` and `end`, inclusive.
pub fn attendance_stats(
    records: &[AttendanceRecord],
    student_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> AttendanceStats {
    let in_range: Vec<_> = records
        .iter()
        .filter(|r| r.student_id == student_id && r.date >= start && r.date <= end)
        .collect();

    let total_days = in_range.len();
    let present_days = in_range.iter().filter(|r| r.present).count();
    let justified_absences = in_range.iter().filter(|r| !r.present && r.justified).count();

    AttendanceStats {
        total_days,
        present_days,
        absent_days: total_days - present_days,
        justified_absences,
        attendance_rate: (total_days > 0)
            .then(|| round_to(present_days as f64 / total_days as f64 * 100.0, 1)),
    }
}

/// Mean grade, two decimals, optionally for one subject.
pub fn grade_average(grades: &[GradeRecord], student_id: &str, subject: Option<&str>) -> Option<f64> {
    let selected: Vec<f64> = grades
        .iter()
        .filter(|g| g.student_id == student_id)
        .filter(|g| subject.map_or(true, |s| g.subject == s))
        .map(|g| g.grade)
        .collect();

    if selected.is_empty() {
        return None;
    }
    Some(round_to(selected.iter().sum::<f64>() / selected.len() as f64, 2))
}

/// A student's attendance, newest first, at most `limit` entries.
pub fn student_attendance(
    records: &[AttendanceRecord],
    student_id: &str,
    limit: usize,
) -> Vec<AttendanceRecord> {
    let mut selected: Vec<_> = records
        .iter()
        .filter(|r| r.student_id == student_id)
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    selected.truncate(limit);
    selected
}

/// A student's grades, newest first.
pub fn student_grades(grades: &[GradeRecord], student_id: &str) -> Vec<GradeRecord> {
    let mut selected: Vec<_> = grades
        .iter()
        .filter(|g| g.student_id == student_id)
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    selected
}

/// Messages sent or received by `user_id`, newest first.
pub fn user_messages(messages: &[MessageRecord], user_id: &str, limit: usize) -> Vec<MessageRecord> {
    let mut selected: Vec<_> = messages
        .iter()
        .filter(|m| m.involves(user_id))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    selected.truncate(limit);
    selected
}

pub fn unread_count(messages: &[MessageRecord], user_id: &str) -> usize {
    messages.iter().filter(|m| m.is_unread_for(user_id)).count()
}

/// Group a user's messages by the other participant. Names and roles come
/// from the rosters when the participant id is found there.
pub fn group_conversations(
    user_id: &str,
    messages: Vec<MessageRecord>,
    teachers: &[TeacherRecord],
    parents: &[ParentRecord],
) -> Vec<Conversation> {
    let mut by_participant: HashMap<String, Vec<MessageRecord>> = HashMap::new();
    for message in messages {
        by_participant
            .entry(message.other_party(user_id).to_string())
            .or_default()
            .push(message);
    }

    let mut conversations: Vec<Conversation> = by_participant
        .into_iter()
        .filter_map(|(participant_id, mut messages)| {
            messages.sort_by(|a, b| a.date.cmp(&b.date));
            let last_message = messages.last()?.clone();
            let unread_count = messages.iter().filter(|m| m.is_unread_for(user_id)).count();

            let (participant_name, participant_role) =
                if let Some(t) = teachers.iter().find(|t| t.id == participant_id) {
                    (Some(t.display_name()), Some(RoleKind::Teacher))
                } else if let Some(p) = parents.iter().find(|p| p.id == participant_id) {
                    (Some(p.display_name()), Some(RoleKind::Parent))
                } else {
                    (None, None)
                };

            Some(Conversation {
                participant_id,
                participant_name,
                participant_role,
                last_message,
                unread_count,
                messages,
            })
        })
        .collect();

    conversations.sort_by(|a, b| b.last_message.date.cmp(&a.last_message.date));
    conversations
}

#[derive(Clone)]
pub struct SchoolService {
    roster: Arc<dyn RosterSource>,
}

impl SchoolService {
    pub fn new(roster: Arc<dyn RosterSource>) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &dyn RosterSource {
        self.roster.as_ref()
    }

    pub async fn student_by_id(&self, student_id: &str) -> Result<Option<StudentRecord>, RosterError> {
        Ok(self
            .roster
            .students()
            .await?
            .into_iter()
            .find(|s| s.id == student_id))
    }

    pub async fn students_by_parent(&self, parent_id: &str) -> Result<Vec<StudentRecord>, RosterError> {
        Ok(self
            .roster
            .students()
            .await?
            .into_iter()
            .filter(|s| s.parent_id == parent_id)
            .collect())
    }

    pub async fn class_by_id(&self, class_id: &str) -> Result<Option<ClassRecord>, RosterError> {
        Ok(self
            .roster
            .classes()
            .await?
            .into_iter()
            .find(|c| c.id == class_id))
    }

    pub async fn teacher_by_id(&self, teacher_id: &str) -> Result<Option<TeacherRecord>, RosterError> {
        Ok(self
            .roster
            .teachers()
            .await?
            .into_iter()
            .find(|t| t.id == teacher_id))
    }

    pub async fn parent_by_id(&self, parent_id: &str) -> Result<Option<ParentRecord>, RosterError> {
        Ok(self
            .roster
            .parents()
            .await?
            .into_iter()
            .find(|p| p.id == parent_id))
    }

    pub async fn attendance_by_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, RosterError> {
        Ok(self
            .roster
            .attendance()
            .await?
            .into_iter()
            .filter(|r| r.date == date)
            .collect())
    }

    pub async fn attendance_by_student(
        &self,
        student_id: &str,
        limit: usize,
    ) -> Result<Vec<AttendanceRecord>, RosterError> {
        let records = self.roster.attendance().await?;
        Ok(student_attendance(&records, student_id, limit))
    }

    pub async fn grades_by_student(&self, student_id: &str) -> Result<Vec<GradeRecord>, RosterError> {
        let grades = self.roster.grades().await?;
        Ok(student_grades(&grades, student_id))
    }

    pub async fn grades_by_class_and_subject(
        &self,
        class_id: &str,
        subject: &str,
    ) -> Result<Vec<GradeRecord>, RosterError> {
        let (grades, students) = tokio::try_join!(self.roster.grades(), self.roster.students())?;

        let student_ids: Vec<&str> = students
            .iter()
            .filter(|s| s.class_id.as_deref() == Some(class_id))
            .map(|s| s.id.as_str())
            .collect();

        Ok(grades
            .into_iter()
            .filter(|g| g.subject == subject && student_ids.contains(&g.student_id.as_str()))
            .collect())
    }

    pub async fn messages_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, RosterError> {
        let messages = self.roster.messages().await?;
        Ok(user_messages(&messages, user_id, limit))
    }

    /// Messages between two users, oldest first, keeping the latest `limit`.
    pub async fn conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, RosterError> {
        let mut selected: Vec<_> = self
            .roster
            .messages()
            .await?
            .into_iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .collect();
        selected.sort_by(|a, b| a.date.cmp(&b.date));
        let skip = selected.len().saturating_sub(limit);
        Ok(selected.split_off(skip))
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<usize, RosterError> {
        let messages = self.roster.messages().await?;
        Ok(unread_count(&messages, user_id))
    }

    pub async fn attendance_stats(
        &self,
        student_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceStats, RosterError> {
        let records = self.roster.attendance().await?;
        Ok(attendance_stats(&records, student_id, start, end))
    }

    pub async fn grade_average(
        &self,
        student_id: &str,
        subject: Option<&str>,
    ) -> Result<Option<f64>, RosterError> {
        let grades = self.roster.grades().await?;
        Ok(grade_average(&grades, student_id, subject))
    }

    pub async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, RosterError> {
        let (messages, teachers, parents) = tokio::try_join!(
            self.roster.messages(),
            self.roster.teachers(),
            self.roster.parents()
        )?;

        let recent = user_messages(&messages, user_id, DEFAULT_CONVERSATION_LIMIT);
        Ok(group_conversations(user_id, recent, &teachers, &parents))
    }

    /// Roster people the user may write to. Admins have no roster entry and
    /// so never appear.
    pub async fn contacts(
        &self,
        assignment: &RoleAssignment,
        user_id: &str,
    ) -> Result<Vec<Contact>, RosterError> {
        let (teachers, parents) = tokio::try_join!(self.roster.teachers(), self.roster.parents())?;

        let mut contacts = Vec::new();
        if can_message(assignment, RoleKind::Teacher) {
            contacts.extend(teachers.into_iter().filter(|t| t.id != user_id).map(|t| Contact {
                name: t.display_name(),
                id: t.id,
                role: RoleKind::Teacher,
                email: t.email,
            }));
        }
        if can_message(assignment, RoleKind::Parent) {
            contacts.extend(parents.into_iter().filter(|p| p.id != user_id).map(|p| Contact {
                name: p.display_name(),
                id: p.id,
                role: RoleKind::Parent,
                email: p.email,
            }));
        }
        Ok(contacts)
    }
}
