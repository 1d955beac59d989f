use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::category::*;
use crate::models::shared::validate_name;
use crate::record::{Category, SubCategory, slugify};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<CategoryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = state.categories.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = validate_name(&payload.name, "Category")?;
    let slug = slug_for(payload.slug.as_deref(), &name)?;

    let existing = state.categories.list_categories().await?;
    if existing.iter().any(|c| c.slug == slug) {
        return Err(AppError::Conflict(format!(
            "A category with slug '{slug}' already exists"
        )));
    }

    let category = Category {
        id: Uuid::now_v7(),
        name,
        slug,
        created_at: Utc::now(),
    };
    state.categories.insert_category(&category).await?;
    info!(id = %category.id, "Created category");

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Fails with 409 CONFLICT while subcategories or content records still reference it.",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Category in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "Category")?;
    if state.categories.find_category(id).await?.is_none() {
        return Err(AppError::NotFound("Category not found".into()));
    }
    if !state.categories.list_subcategories(Some(id)).await?.is_empty() {
        return Err(AppError::Conflict(
            "Cannot delete a category that has subcategories".into(),
        ));
    }
    if state.records.count_in_category(id).await? > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a category that is used by content records".into(),
        ));
    }

    if !state.categories.delete_category(id).await? {
        return Err(AppError::NotFound("Category not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/subcategories",
    tag = "Categories",
    operation_id = "listSubCategories",
    summary = "List subcategories",
    params(SubCategoryQuery),
    responses(
        (status = 200, description = "Subcategories ordered by name", body = Vec<SubCategoryResponse>),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_subcategories(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SubCategoryQuery>,
) -> Result<Json<Vec<SubCategoryResponse>>, AppError> {
    let subcategories = state.categories.list_subcategories(query.category).await?;
    Ok(Json(subcategories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/subcategories",
    tag = "Categories",
    operation_id = "createSubCategory",
    summary = "Create a subcategory",
    request_body = CreateSubCategoryRequest,
    responses(
        (status = 201, description = "Subcategory created", body = SubCategoryResponse),
        (status = 400, description = "Validation error or unknown category (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Slug already in use within the category (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(category_id = %payload.category_id))]
pub async fn create_subcategory(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = validate_name(&payload.name, "Subcategory")?;
    let slug = slug_for(payload.slug.as_deref(), &name)?;

    if state
        .categories
        .find_category(payload.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(format!(
            "Category {} does not exist",
            payload.category_id
        )));
    }

    let siblings = state
        .categories
        .list_subcategories(Some(payload.category_id))
        .await?;
    if siblings.iter().any(|s| s.slug == slug) {
        return Err(AppError::Conflict(format!(
            "A subcategory with slug '{slug}' already exists in this category"
        )));
    }

    let sub = SubCategory {
        id: Uuid::now_v7(),
        category_id: payload.category_id,
        name,
        slug,
        created_at: Utc::now(),
    };
    state.categories.insert_subcategory(&sub).await?;
    info!(id = %sub.id, "Created subcategory");

    Ok((StatusCode::CREATED, Json(SubCategoryResponse::from(sub))))
}

#[utoipa::path(
    delete,
    path = "/subcategories/{id}",
    tag = "Categories",
    operation_id = "deleteSubCategory",
    summary = "Delete a subcategory",
    params(("id" = Uuid, Path, description = "Subcategory ID")),
    responses(
        (status = 204, description = "Subcategory deleted"),
        (status = 404, description = "Subcategory not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Subcategory in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "Subcategory")?;
    if state.categories.find_subcategory(id).await?.is_none() {
        return Err(AppError::NotFound("Subcategory not found".into()));
    }
    if state.records.count_in_subcategory(id).await? > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a subcategory that is used by content records".into(),
        ));
    }
    if !state.categories.delete_subcategory(id).await? {
        return Err(AppError::NotFound("Subcategory not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{what} not found")))
}

fn slug_for(submitted: Option<&str>, name: &str) -> Result<String, AppError> {
    let source = submitted.filter(|s| !s.trim().is_empty()).unwrap_or(name);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "slug must contain letters or digits".into(),
        ));
    }
    Ok(slug)
}
