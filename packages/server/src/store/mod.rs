//! Persistence seam between the lifecycle manager and the document database.
//!
//! Each call is a single-document operation; no cross-document transactions
//! are used. Concurrent writes to one record are last-write-wins.

mod database;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

pub use database::SeaOrmStore;
pub use memory::MemoryStore;

use crate::manifest::EntityKind;
use crate::record::{Category, ContentRecord, SubCategory};

/// Database read or write failure.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// A unique index rejected the write.
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("persistence error: {0}")]
    Backend(String),
}

impl From<DbErr> for PersistenceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => PersistenceError::Duplicate(detail),
            _ => PersistenceError::Backend(err.to_string()),
        }
    }
}

/// Filters applied by [`RecordStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub active_only: bool,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
}

impl RecordQuery {
    pub fn matches(&self, record: &ContentRecord) -> bool {
        (!self.active_only || record.active)
            && self
                .category_id
                .is_none_or(|c| record.category_id == Some(c))
            && self
                .subcategory_id
                .is_none_or(|s| record.subcategory_id == Some(s))
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Option<ContentRecord>, PersistenceError>;

    async fn find_by_slug(
        &self,
        kind: EntityKind,
        slug: &str,
    ) -> Result<Option<ContentRecord>, PersistenceError>;

    /// Unordered records of `kind` matching `query`.
    async fn list(
        &self,
        kind: EntityKind,
        query: &RecordQuery,
    ) -> Result<Vec<ContentRecord>, PersistenceError>;

    async fn insert(&self, record: &ContentRecord) -> Result<(), PersistenceError>;

    /// Full replace. Returns `false` if the record no longer exists.
    async fn update(&self, record: &ContentRecord) -> Result<bool, PersistenceError>;

    /// Mutate only `active` (and `updated_at`).
    async fn set_active(
        &self,
        kind: EntityKind,
        id: Uuid,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>, PersistenceError>;

    /// Returns `false` if nothing was deleted.
    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, PersistenceError>;

    async fn slug_exists(
        &self,
        kind: EntityKind,
        slug: &str,
        except: Option<Uuid>,
    ) -> Result<bool, PersistenceError>;

    async fn count_in_category(&self, category_id: Uuid) -> Result<u64, PersistenceError>;

    async fn count_in_subcategory(&self, subcategory_id: Uuid) -> Result<u64, PersistenceError>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, PersistenceError>;

    async fn insert_category(&self, category: &Category) -> Result<(), PersistenceError>;

    async fn delete_category(&self, id: Uuid) -> Result<bool, PersistenceError>;

    async fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<SubCategory>, PersistenceError>;

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<SubCategory>, PersistenceError>;

    async fn insert_subcategory(&self, sub: &SubCategory) -> Result<(), PersistenceError>;

    async fn delete_subcategory(&self, id: Uuid) -> Result<bool, PersistenceError>;
}
