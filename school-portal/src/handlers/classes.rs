use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use school_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::middleware::StaffUser;
use crate::models::{ClassRecord, GradeRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClassGradesParams {
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct ClassGradesResponse {
    pub class: ClassRecord,
    pub subject: String,
    pub grades: Vec<GradeRecord>,
}

pub async fn class_grades(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Path(class_id): Path<String>,
    Query(params): Query<ClassGradesParams>,
) -> Result<impl IntoResponse, AppError> {
    let class = state
        .school
        .class_by_id(&class_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Class {} not found", class_id)))?;

    let grades = state
        .school
        .grades_by_class_and_subject(&class_id, &params.subject)
        .await?;

    Ok(Json(ClassGradesResponse {
        class,
        subject: params.subject,
        grades,
    }))
}
