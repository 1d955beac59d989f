pub mod categories;
pub mod public;
pub mod records;
pub mod singletons;

use std::future::Future;

use tracing::Instrument;

use crate::error::AppError;
use crate::lifecycle::ManagerError;
use crate::manifest::{EntityKind, UnknownEntity};
use crate::models::content::{CategoryRefs, RecordResponse};
use crate::record::ContentRecord;
use crate::state::AppState;

/// Resolve a collection entity from its path segment. Singletons have their
/// own routes and are unknown here.
fn parse_entity(raw: &str) -> Result<EntityKind, AppError> {
    let unknown = || AppError::NotFound(format!("Unknown entity type '{raw}'"));
    let kind: EntityKind = raw.parse().map_err(|UnknownEntity(_)| unknown())?;
    if kind.manifest().singleton {
        return Err(unknown());
    }
    Ok(kind)
}

/// Run a content mutation on its own task. The mutation finishes even if
/// the request future is dropped mid-way.
async fn run_detached<T, F>(mutation: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, ManagerError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(mutation.in_current_span())
        .await
        .map_err(|e| AppError::Internal(format!("content mutation task failed: {e}")))?
        .map_err(AppError::from)
}

async fn load_refs(state: &AppState) -> Result<CategoryRefs, AppError> {
    let categories = state.categories.list_categories().await?;
    let subcategories = state.categories.list_subcategories(None).await?;
    Ok(CategoryRefs::new(categories, subcategories))
}

async fn to_response(state: &AppState, record: ContentRecord) -> Result<RecordResponse, AppError> {
    let refs = load_refs(state).await?;
    Ok(RecordResponse::new(record, &refs))
}
