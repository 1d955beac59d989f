//! Read-side queries for public pages: active filter, display ordering and
//! offset pagination.

use std::cmp::Ordering;

use tracing::instrument;
use uuid::Uuid;

use crate::manifest::EntityKind;
use crate::record::ContentRecord;
use crate::store::{PersistenceError, RecordQuery, RecordStore};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Optional reference filters for [`list_active`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
}

/// One page of a materialized sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Active records of `kind`, in display order.
#[instrument(skip(store), fields(entity = %kind))]
pub async fn list_active(
    store: &dyn RecordStore,
    kind: EntityKind,
    filter: ListFilter,
) -> Result<Vec<ContentRecord>, PersistenceError> {
    let query = RecordQuery {
        active_only: true,
        category_id: filter.category_id,
        subcategory_id: filter.subcategory_id,
    };
    let mut records = store.list(kind, &query).await?;
    records.retain(|r| r.active);
    sort_for_display(&mut records);
    Ok(records)
}

/// Every record of `kind` regardless of status, in display order.
#[instrument(skip(store), fields(entity = %kind))]
pub async fn list_all(
    store: &dyn RecordStore,
    kind: EntityKind,
) -> Result<Vec<ContentRecord>, PersistenceError> {
    let mut records = store.list(kind, &RecordQuery::default()).await?;
    sort_for_display(&mut records);
    Ok(records)
}

/// Records with a display order come first, ascending. The rest, and ties,
/// are newest first.
pub fn sort_for_display(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| {
        let by_order = match (a.display_order, b.display_order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_order.then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Offset slicing. Page numbers start at 1; page 0 and pages past the end
/// are empty rather than errors.
pub fn paginate<T>(items: Vec<T>, page_size: u64, page_number: u64) -> Page<T> {
    let per_page = page_size.max(1);
    let total = items.len() as u64;
    let total_pages = total.div_ceil(per_page);

    let items = if page_number == 0 {
        Vec::new()
    } else {
        let offset = (page_number - 1).saturating_mul(per_page);
        items
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(per_page).unwrap_or(usize::MAX))
            .collect()
    };

    Page {
        items,
        page: page_number,
        per_page,
        total,
        total_pages,
    }
}

/// Clamp raw query parameters to a valid `(page, per_page)` pair.
pub fn page_params(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, per_page)
}
