//! Anonymous read and submission endpoints used by the public site.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value};
use tracing::instrument;

use super::{load_refs, parse_entity, run_detached, to_response};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{AppJson, AppQuery};
use crate::listing::{ListFilter, list_active, page_params, paginate};
use crate::mailer::MailError;
use crate::manifest::EntityKind;
use crate::models::content::{RecordListResponse, RecordResponse};
use crate::models::public::*;
use crate::models::shared::Pagination;
use crate::state::AppState;
use crate::submission::RecordSubmission;

/// Entities that take anonymous submissions hold visitor data and are never
/// listed publicly.
fn publicly_readable(entity: &str) -> Result<EntityKind, AppError> {
    let kind = parse_entity(entity)?;
    if kind.manifest().public_submission {
        return Err(AppError::NotFound(format!("Unknown entity type '{entity}'")));
    }
    Ok(kind)
}

#[utoipa::path(
    get,
    path = "/{entity}",
    tag = "Public",
    operation_id = "listPublicRecords",
    summary = "List active records",
    description = "Active records only, ordered by display order and then newest first. \
        `category` and `subcategory` accept an id or a slug; an unknown one yields an empty page.",
    params(
        ("entity" = String, Path, description = "Entity type"),
        PublicListQuery,
    ),
    responses(
        (status = 200, description = "Active records", body = RecordListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown entity type (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_public(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    AppQuery(query): AppQuery<PublicListQuery>,
) -> Result<Json<RecordListResponse>, AppError> {
    let kind = publicly_readable(&entity)?;
    let (page, per_page) = page_params(query.page, query.per_page);
    let refs = load_refs(&state).await?;

    let category_id = query.category.as_deref().map(|c| refs.find_category(c));
    let subcategory_id = query.subcategory.as_deref().map(|s| refs.find_subcategory(s));

    // A filter naming an unknown reference matches nothing.
    let records = if matches!(category_id, Some(None)) || matches!(subcategory_id, Some(None)) {
        Vec::new()
    } else {
        let filter = ListFilter {
            category_id: category_id.flatten(),
            subcategory_id: subcategory_id.flatten(),
        };
        list_active(&*state.records, kind, filter).await?
    };

    let page = paginate(records, per_page, page);
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
    tag = "Public",
    operation_id = "getPublicRecord",
    summary = "Get an active record by slug or id",
    params(
        ("entity" = String, Path, description = "Entity type"),
        ("id" = String, Path, description = "Record slug or UUID"),
    ),
    responses(
        (status = 200, description = "Record", body = RecordResponse),
        (status = 404, description = "Record not found or inactive (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_public(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<RecordResponse>, AppError> {
    let kind = publicly_readable(&entity)?;
    let record = state.manager.get(kind, &id).await?;
    if !record.active {
        return Err(AppError::NotFound(format!("{kind} record '{id}' not found")));
    }
    Ok(Json(to_response(&state, record).await?))
}

#[utoipa::path(
    post,
    path = "/{entity}",
    tag = "Public",
    operation_id = "submitPublicRecord",
    summary = "Submit an application",
    description = "Anonymous submission for entities that accept one (`scholarships`). \
        Only the entity's declared fields are read.",
    params(("entity" = String, Path, description = "Entity type")),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 201, description = "Submission stored", body = RecordResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Entity does not accept submissions (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, fields))]
pub async fn submit_public(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    AppJson(fields): AppJson<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_entity(&entity)?;
    let manifest = kind.manifest();
    if !manifest.public_submission {
        return Err(AppError::NotFound(format!(
            "{kind} does not accept public submissions"
        )));
    }

    // Status, ordering and references stay under admin control.
    let fields: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| manifest.field(key).is_some())
        .collect();

    let manager = state.manager.clone();
    let submission = RecordSubmission::from_json(fields);
    let record = run_detached(async move { manager.create(kind, submission).await }).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, record).await?)))
}

#[utoipa::path(
    post,
    path = "/contact",
    tag = "Public",
    operation_id = "submitContact",
    summary = "Send a contact form message",
    description = "Forwards the message to the configured inbox. Without a mail relay the message is logged and accepted.",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message accepted", body = ContactResponse),
        (status = 400, description = "Missing or invalid fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Mail relay failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = payload.validate()?;

    state
        .mailer
        .send_contact(&contact)
        .await
        .map_err(|e| match e {
            MailError::Address(msg) => AppError::Validation(format!("Invalid email address: {msg}")),
            other => AppError::Internal(other.to_string()),
        })?;

    Ok(Json(ContactResponse {
        message: "Message received".into(),
    }))
}
