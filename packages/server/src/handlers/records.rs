use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use super::{load_refs, parse_entity, run_detached, to_response};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{AppJson, AppQuery};
use crate::listing::{self, page_params, paginate};
use crate::models::content::*;
use crate::models::shared::Pagination;
use crate::state::AppState;
use crate::submission::RecordSubmission;

/// Room for multipart framing and text fields on top of the file itself.
const FORM_OVERHEAD: u64 = 1024 * 1024;

pub fn record_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(usize::try_from(max_upload_size + FORM_OVERHEAD).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/{entity}",
    tag = "Content",
    operation_id = "listRecords",
    summary = "List records of an entity type",
    description = "Returns every record of the entity type, active or not, ordered by display order \
        (ascending) and then newest first. Use `active` to filter by status.",
    params(
        ("entity" = String, Path, description = "Entity type, e.g. `blogs`, `current-affairs`"),
        AdminListQuery,
    ),
    responses(
        (status = 200, description = "Records", body = RecordListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown entity type (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_records(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    AppQuery(query): AppQuery<AdminListQuery>,
) -> Result<Json<RecordListResponse>, AppError> {
    let kind = parse_entity(&entity)?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let mut records = listing::list_all(&*state.records, kind).await?;
    if let Some(active) = query.active {
        records.retain(|r| r.active == active);
    }

    let page = paginate(records, per_page, page);
    let refs = load_refs(&state).await?;
    let pagination = Pagination::from(&page);
    let data = page
        .items
        .into_iter()
        .map(|r| RecordResponse::new(r, &refs))
        .collect();

    Ok(Json(RecordListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/{entity}/{id}",
    tag = "Content",
    operation_id = "getRecord",
    summary = "Get a record by id or slug",
    params(
        ("entity" = String, Path, description = "Entity type"),
        ("id" = String, Path, description = "Record UUID or slug"),
    ),
    responses(
        (status = 200, description = "Record", body = RecordResponse),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<RecordResponse>, AppError> {
    let kind = parse_entity(&entity)?;
    let record = state.manager.get(kind, &id).await?;
    Ok(Json(to_response(&state, record).await?))
}

#[utoipa::path(
    post,
    path = "/{entity}",
    tag = "Content",
    operation_id = "createRecord",
    summary = "Create a record",
    description = "Accepts `multipart/form-data` (with file parts named after the entity's media slots, \
        `image` for most entities and `fileEN` / `fileHI` for `elearnings`) or a JSON object. \
        Localized fields are sent as `{\"en\", \"hi\"}` objects, JSON-encoded strings of that shape, \
        or split `{field}En` / `{field}Hi` keys. Validation runs before any file is uploaded.",
    params(("entity" = String, Path, description = "Entity type")),
    request_body(content_type = "multipart/form-data", description = "Record fields and file parts"),
    responses(
        (status = 201, description = "Record created", body = RecordResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown entity type (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
        (status = 500, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, submission))]
pub async fn create_record(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    submission: RecordSubmission,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_entity(&entity)?;
    let manager = state.manager.clone();
    let record = run_detached(async move { manager.create(kind, submission).await }).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, record).await?)))
}

#[utoipa::path(
    put,
    path = "/{entity}/{id}",
    tag = "Content",
    operation_id = "updateRecord",
    summary = "Update a record",
    description = "Same payload as create. Omitted fields, and omitted locales of localized fields, \
        keep their stored values. A new file replaces the one stored in the same slot; the previous object is deleted.",
    params(
        ("entity" = String, Path, description = "Entity type"),
        ("id" = String, Path, description = "Record UUID or slug"),
    ),
    request_body(content_type = "multipart/form-data", description = "Changed fields and replacement file parts"),
    responses(
        (status = 200, description = "Record updated", body = RecordResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
        (status = 500, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, submission))]
pub async fn update_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    submission: RecordSubmission,
) -> Result<Json<RecordResponse>, AppError> {
    let kind = parse_entity(&entity)?;
    let manager = state.manager.clone();
    let record = run_detached(async move { manager.update(kind, &id, submission).await }).await?;
    Ok(Json(to_response(&state, record).await?))
}

#[utoipa::path(
    patch,
    path = "/{entity}/{id}",
    tag = "Content",
    operation_id = "setRecordActive",
    summary = "Activate or deactivate a record",
    description = "Changes only the `active` flag. Inactive records are hidden from public listings.",
    params(
        ("entity" = String, Path, description = "Entity type"),
        ("id" = String, Path, description = "Record UUID or slug"),
    ),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Status changed", body = RecordResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(active = payload.active))]
pub async fn set_record_active(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    AppJson(payload): AppJson<SetActiveRequest>,
) -> Result<Json<RecordResponse>, AppError> {
    let kind = parse_entity(&entity)?;
    let manager = state.manager.clone();
    let record =
        run_detached(async move { manager.set_active(kind, &id, payload.active).await }).await?;
    Ok(Json(to_response(&state, record).await?))
}

#[utoipa::path(
    delete,
    path = "/{entity}/{id}",
    tag = "Content",
    operation_id = "deleteRecord",
    summary = "Delete a record and its media",
    description = "Deletes every attached media object first (failures are logged only), then the record.",
    params(
        ("entity" = String, Path, description = "Entity type"),
        ("id" = String, Path, description = "Record UUID or slug"),
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let kind = parse_entity(&entity)?;
    let manager = state.manager.clone();
    run_detached(async move { manager.delete(kind, &id).await }).await?;
    Ok(StatusCode::NO_CONTENT)
}
