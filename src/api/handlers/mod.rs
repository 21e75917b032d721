use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::estimator;
use crate::models::*;
use crate::report;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Estimation
// ============================================================

/// Query parameters for a standalone estimate.
#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub kloc: Option<f64>,
}

/// Compute a COCOMO estimate without touching any stored project.
/// Missing kloc is treated as 0; negative values are clamped to 0.
pub async fn get_estimate(Query(query): Query<EstimateQuery>) -> Json<Estimate> {
    let kloc = query.kloc.unwrap_or(0.0).max(0.0);
    Json(estimator::estimate(kloc))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, (StatusCode, String)> {
    let projects = state.db.get_all_projects().map_err(internal_error)?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, (StatusCode, String)> {
    state
        .db
        .get_project(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(form): Json<ProjectForm>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    state
        .db
        .create_project(form)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, (StatusCode, String)> {
    state
        .db
        .update_project(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.db.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Project not found".to_string()))
    }
}

// ============================================================
// Reports
// ============================================================

type DocxResponse = ([(header::HeaderName, String); 2], Vec<u8>);

fn docx_response(filename: String, bytes: Vec<u8>) -> DocxResponse {
    (
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
}

/// Assemble and serialize the report for a stored project.
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<DocxResponse, (StatusCode, String)> {
    let project = state
        .db
        .get_project(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))?;

    let demo_url = format!("{}{}", state.demo_base, project.id);
    let document = report::assemble(&project.form, &demo_url);
    let bytes = report::to_docx_bytes(&document).map_err(internal_error)?;
    let filename = report::suggested_filename(project.form.title.as_deref());

    Ok(docx_response(filename, bytes))
}

/// Assemble and serialize a report directly from a posted form, without
/// persisting it. The estimate is recomputed from the submitted kloc
/// before assembly, like on every other path.
pub async fn build_report(
    State(state): State<AppState>,
    Json(mut form): Json<ProjectForm>,
) -> Result<DocxResponse, (StatusCode, String)> {
    form.cocomo = Some(estimator::estimate(form.requested_kloc()));

    let demo_url = format!("{}local", state.demo_base);
    let document = report::assemble(&form, &demo_url);
    let bytes = report::to_docx_bytes(&document).map_err(internal_error)?;
    let filename = report::suggested_filename(form.title.as_deref());

    Ok(docx_response(filename, bytes))
}
