use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use school_core::error::AppError;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::StaffUser;
use crate::models::{NewAttendance, RoleAssignment};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AttendanceParams {
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

pub async fn attendance_for_date(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Query(params): Query<AttendanceParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = params.date.unwrap_or_else(super::today);
    let records = state.school.attendance_by_date(date).await?;
    Ok(Json(records))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    StaffUser(user): StaffUser,
    Json(payload): Json<NewAttendance>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let teacher_id = match &user.assignment {
        RoleAssignment::Teacher { teacher } => Some(teacher.id.as_str()),
        RoleAssignment::Admin | RoleAssignment::Parent { .. } | RoleAssignment::Unknown => None,
    };

    let record = state
        .school
        .roster()
        .add_attendance(teacher_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}
