use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::{CategoryStore, PersistenceError, RecordQuery, RecordStore};
use crate::manifest::EntityKind;
use crate::record::{Category, ContentRecord, SubCategory};

/// In-process store selected with `database.url = "memory://"`.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<Uuid, ContentRecord>,
    categories: DashMap<Uuid, Category>,
    subcategories: DashMap<Uuid, SubCategory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors the `(entity, slug)` unique index of the database schema.
    fn ensure_slug_free(&self, record: &ContentRecord) -> Result<(), PersistenceError> {
        let Some(slug) = &record.slug else {
            return Ok(());
        };
        let taken = self.records.iter().any(|r| {
            r.id != record.id && r.kind == record.kind && r.slug.as_ref() == Some(slug)
        });
        if taken {
            return Err(PersistenceError::Duplicate(format!(
                "{} slug {slug}",
                record.kind
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Option<ContentRecord>, PersistenceError> {
        Ok(self
            .records
            .get(&id)
            .filter(|r| r.kind == kind)
            .map(|r| r.clone()))
    }

    async fn find_by_slug(
        &self,
        kind: EntityKind,
        slug: &str,
    ) -> Result<Option<ContentRecord>, PersistenceError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.kind == kind && r.slug.as_deref() == Some(slug))
            .map(|r| r.clone()))
    }

    async fn list(
        &self,
        kind: EntityKind,
        query: &RecordQuery,
    ) -> Result<Vec<ContentRecord>, PersistenceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.kind == kind && query.matches(r))
            .map(|r| r.clone())
            .collect())
    }

    async fn insert(&self, record: &ContentRecord) -> Result<(), PersistenceError> {
        if self.records.contains_key(&record.id) {
            return Err(PersistenceError::Duplicate(format!("id {}", record.id)));
        }
        self.ensure_slug_free(record)?;
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &ContentRecord) -> Result<bool, PersistenceError> {
        self.ensure_slug_free(record)?;
        match self.records.get_mut(&record.id) {
            Some(mut existing) if existing.kind == record.kind => {
                *existing = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_active(
        &self,
        kind: EntityKind,
        id: Uuid,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>, PersistenceError> {
        match self.records.get_mut(&id) {
            Some(mut existing) if existing.kind == kind => {
                existing.active = active;
                existing.updated_at = at;
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, PersistenceError> {
        Ok(self.records.remove_if(&id, |_, r| r.kind == kind).is_some())
    }

    async fn slug_exists(
        &self,
        kind: EntityKind,
        slug: &str,
        except: Option<Uuid>,
    ) -> Result<bool, PersistenceError> {
        Ok(self.records.iter().any(|r| {
            r.kind == kind && r.slug.as_deref() == Some(slug) && Some(r.id) != except
        }))
    }

    async fn count_in_category(&self, category_id: Uuid) -> Result<u64, PersistenceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.category_id == Some(category_id))
            .count() as u64)
    }

    async fn count_in_subcategory(&self, subcategory_id: Uuid) -> Result<u64, PersistenceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.subcategory_id == Some(subcategory_id))
            .count() as u64)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        let mut all: Vec<Category> = self.categories.iter().map(|c| c.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, PersistenceError> {
        Ok(self.categories.get(&id).map(|c| c.clone()))
    }

    async fn insert_category(&self, category: &Category) -> Result<(), PersistenceError> {
        if self.categories.iter().any(|c| c.slug == category.slug) {
            return Err(PersistenceError::Duplicate(format!(
                "category slug {}",
                category.slug
            )));
        }
        self.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, PersistenceError> {
        Ok(self.categories.remove(&id).is_some())
    }

    async fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<SubCategory>, PersistenceError> {
        let mut all: Vec<SubCategory> = self
            .subcategories
            .iter()
            .filter(|s| category_id.is_none_or(|c| s.category_id == c))
            .map(|s| s.clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<SubCategory>, PersistenceError> {
        Ok(self.subcategories.get(&id).map(|s| s.clone()))
    }

    async fn insert_subcategory(&self, sub: &SubCategory) -> Result<(), PersistenceError> {
        self.subcategories.insert(sub.id, sub.clone());
        Ok(())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<bool, PersistenceError> {
        Ok(self.subcategories.remove(&id).is_some())
    }
}
