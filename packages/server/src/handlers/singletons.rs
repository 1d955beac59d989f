//! Site-wide single records: web settings and the results section block.
//!
//! Each has one fixed path. `PUT` creates the record on first save and edits
//! it in place afterwards.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::{run_detached, to_response};
use crate::error::{AppError, ErrorBody};
use crate::manifest::EntityKind;
use crate::models::content::RecordResponse;
use crate::state::AppState;
use crate::submission::RecordSubmission;

async fn read(state: &AppState, kind: EntityKind) -> Result<Json<RecordResponse>, AppError> {
    let record = state.manager.get_singleton(kind).await?;
    Ok(Json(to_response(state, record).await?))
}

async fn save(
    state: &AppState,
    kind: EntityKind,
    submission: RecordSubmission,
) -> Result<Json<RecordResponse>, AppError> {
    let manager = state.manager.clone();
    let record = run_detached(async move { manager.upsert_singleton(kind, submission).await }).await?;
    Ok(Json(to_response(state, record).await?))
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "Site",
    operation_id = "getSettings",
    summary = "Get the web settings",
    responses(
        (status = 200, description = "Web settings", body = RecordResponse),
        (status = 404, description = "Settings have not been saved yet (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<RecordResponse>, AppError> {
    read(&state, EntityKind::Settings).await
}

#[utoipa::path(
    put,
    path = "/settings",
    tag = "Site",
    operation_id = "saveSettings",
    summary = "Save the web settings",
    description = "Institute name, contact details, map embed and social links. `name`, `phone` and \
        `email` are required on first save. An `image` file part replaces the logo; the previous \
        object is deleted.",
    request_body(content_type = "multipart/form-data", description = "Changed fields and optional `image` logo"),
    responses(
        (status = 200, description = "Settings saved", body = RecordResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, submission))]
pub async fn save_settings(
    State(state): State<AppState>,
    submission: RecordSubmission,
) -> Result<Json<RecordResponse>, AppError> {
    save(&state, EntityKind::Settings, submission).await
}

#[utoipa::path(
    get,
    path = "/result-section",
    tag = "Site",
    operation_id = "getResultSection",
    summary = "Get the results section block",
    responses(
        (status = 200, description = "Results section", body = RecordResponse),
        (status = 404, description = "Section has not been saved yet (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_result_section(
    State(state): State<AppState>,
) -> Result<Json<RecordResponse>, AppError> {
    read(&state, EntityKind::ResultSection).await
}

#[utoipa::path(
    put,
    path = "/result-section",
    tag = "Site",
    operation_id = "saveResultSection",
    summary = "Save the results section block",
    description = "`description` is required on first save. `buttonText` defaults to \
        \"View All Results\" and `buttonLink` to \"/results\".",
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Section saved", body = RecordResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, submission))]
pub async fn save_result_section(
    State(state): State<AppState>,
    submission: RecordSubmission,
) -> Result<Json<RecordResponse>, AppError> {
    save(&state, EntityKind::ResultSection, submission).await
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "Public",
    operation_id = "getPublicSettings",
    summary = "Web settings for the site header and footer",
    responses(
        (status = 200, description = "Web settings", body = RecordResponse),
        (status = 404, description = "Settings have not been saved yet (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn public_settings(
    State(state): State<AppState>,
) -> Result<Json<RecordResponse>, AppError> {
    read(&state, EntityKind::Settings).await
}

#[utoipa::path(
    get,
    path = "/result-section",
    tag = "Public",
    operation_id = "getPublicResultSection",
    summary = "Results section block for the home page",
    responses(
        (status = 200, description = "Results section", body = RecordResponse),
        (status = 404, description = "Section has not been saved yet (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn public_result_section(
    State(state): State<AppState>,
) -> Result<Json<RecordResponse>, AppError> {
    read(&state, EntityKind::ResultSection).await
}
