use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use school_core::error::AppError;
use serde::Serialize;

use crate::middleware::{RecognizedUser, StaffUser};
use crate::models::{ParentRecord, StudentRecord};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ParentStudentsResponse {
    pub parent: ParentRecord,
    pub students: Vec<StudentRecord>,
}

pub async fn parent_students(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(parent_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (parent, students) = tokio::try_join!(
        state.school.parent_by_id(&parent_id),
        state.school.students_by_parent(&parent_id),
    )?;
    let parent =
        parent.ok_or_else(|| AppError::NotFound(anyhow!("Parent {} not found", parent_id)))?;

    Ok(Json(ParentStudentsResponse { parent, students }))
}

/// Teacher contact card; parents may read it too.
pub async fn get_teacher(
    State(state): State<AppState>,
    RecognizedUser(_user): RecognizedUser,
    Path(teacher_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let teacher = state
        .school
        .teacher_by_id(&teacher_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Teacher {} not found", teacher_id)))?;
    Ok(Json(teacher))
}
