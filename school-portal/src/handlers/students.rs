use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, NaiveDate};
use school_core::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::{RecognizedUser, StaffUser};
use crate::models::{AttendanceRecord, GradeRecord, NewStudent};
use crate::services::access::can_view_student;
use crate::services::school::{AttendanceStats, DEFAULT_ATTENDANCE_LIMIT};
use crate::services::UserSession;
use crate::AppState;

const DEFAULT_STATS_DAYS: i64 = 30;

fn ensure_can_view(user: &UserSession, student_id: &str) -> Result<(), AppError> {
    if can_view_student(&user.assignment, student_id) {
        return Ok(());
    }
    tracing::warn!(
        email = %user.identity.email(),
        student_id = %student_id,
        "Student access denied"
    );
    Err(AppError::Forbidden(anyhow!(
        "Not allowed to view student {}",
        student_id
    )))
}

pub async fn get_student(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ensure_can_view(&user, &student_id)?;

    let student = state
        .school
        .student_by_id(&student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Student {} not found", student_id)))?;

    let overview = state.school.student_overview(student, super::today()).await?;
    Ok(Json(overview))
}

#[derive(Debug, Deserialize)]
pub struct StudentAttendanceParams {
    pub limit: Option<usize>,
    /// Start of the statistics window; defaults to 30 days before `to`.
    pub from: Option<NaiveDate>,
    /// End of the statistics window; defaults to today.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct StudentAttendanceResponse {
    pub student_id: String,
    pub records: Vec<AttendanceRecord>,
    pub stats: AttendanceStats,
}

pub async fn student_attendance(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Path(student_id): Path<String>,
    Query(params): Query<StudentAttendanceParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_can_view(&user, &student_id)?;

    let to = params.to.unwrap_or_else(super::today);
    let from = params
        .from
        .unwrap_or_else(|| to - Duration::days(DEFAULT_STATS_DAYS));
    if from > to {
        return Err(AppError::BadRequest(anyhow!(
            "Window start {} is after its end {}",
            from,
            to
        )));
    }

    let limit = params.limit.unwrap_or(DEFAULT_ATTENDANCE_LIMIT);
    let (records, stats) = tokio::try_join!(
        state.school.attendance_by_student(&student_id, limit),
        state.school.attendance_stats(&student_id, from, to),
    )?;

    Ok(Json(StudentAttendanceResponse {
        student_id,
        records,
        stats,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StudentGradesParams {
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentGradesResponse {
    pub student_id: String,
    pub subject: Option<String>,
    /// Newest first.
    pub grades: Vec<GradeRecord>,
    pub average: Option<f64>,
}

pub async fn student_grades(
    State(state): State<AppState>,
    RecognizedUser(user): RecognizedUser,
    Path(student_id): Path<String>,
    Query(params): Query<StudentGradesParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_can_view(&user, &student_id)?;

    let subject = params.subject.as_deref();
    let (grades, average) = tokio::try_join!(
        state.school.grades_by_student(&student_id),
        state.school.grade_average(&student_id, subject),
    )?;
    let grades = grades
        .into_iter()
        .filter(|g| subject.map_or(true, |s| g.subject == s))
        .collect();

    Ok(Json(StudentGradesResponse {
        student_id,
        subject: params.subject,
        grades,
        average,
    }))
}

pub async fn register_student(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Json(payload): Json<NewStudent>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let student = state.school.roster().register_student(&payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}
