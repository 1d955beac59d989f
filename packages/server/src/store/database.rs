use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cms_common::storage::MediaReference;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use super::{CategoryStore, PersistenceError, RecordQuery, RecordStore};
use crate::entity::{category, content_record, sub_category};
use crate::manifest::{EntityKind, IMAGE_SLOT};
use crate::record::{
    CURRENT_SCHEMA_VERSION, Category, ContentRecord, SubCategory, localized_from_stored,
    localized_to_stored, plain_from_stored, plain_to_stored,
};

/// Document store backed by the relational database through sea-orm.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Convert a row to the canonical record, upgrading legacy layouts.
pub(crate) fn record_from_model(model: content_record::Model) -> Result<ContentRecord, PersistenceError> {
    let kind = model
        .entity
        .parse::<EntityKind>()
        .map_err(|e| {
            PersistenceError::Backend(format!("unknown entity type in row {}: {}", model.id, e.0))
        })?;

    let mut media: BTreeMap<String, MediaReference> = match model.files {
        Some(files) => serde_json::from_value(files).unwrap_or_else(|e| {
            tracing::warn!(id = %model.id, error = %e, "Unreadable attachment list");
            BTreeMap::new()
        }),
        None => BTreeMap::new(),
    };

    // A media URL without its key cannot be cleaned up; keep it visible anyway.
    let image = match (model.media_url, model.media_key) {
        (Some(url), Some(key)) => Some(MediaReference {
            url,
            key,
            alt: model.media_alt,
        }),
        (Some(url), None) => {
            tracing::warn!(id = %model.id, "Media reference without object key");
            Some(MediaReference {
                url,
                key: String::new(),
                alt: model.media_alt,
            })
        }
        _ => None,
    };
    if let Some(image) = image {
        media.insert(IMAGE_SLOT.to_string(), image);
    }

    Ok(ContentRecord {
        id: model.id,
        kind,
        slug: model.slug,
        localized: localized_from_stored(&model.localized),
        plain: plain_from_stored(&model.fields),
        media,
        active: model.active,
        display_order: model.display_order,
        category_id: model.category_id,
        subcategory_id: model.subcategory_id,
        schema_version: Ord::max(model.schema_version, CURRENT_SCHEMA_VERSION),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn active_model_from_record(record: &ContentRecord) -> content_record::ActiveModel {
    let image = record.image();
    let files: BTreeMap<&String, &MediaReference> = record
        .media
        .iter()
        .filter(|(slot, _)| slot.as_str() != IMAGE_SLOT)
        .collect();
    content_record::ActiveModel {
        id: Set(record.id),
        entity: Set(record.kind.as_str().to_string()),
        slug: Set(record.slug.clone()),
        localized: Set(localized_to_stored(&record.localized)),
        fields: Set(plain_to_stored(&record.plain)),
        media_url: Set(image.map(|m| m.url.clone())),
        media_key: Set(image.map(|m| m.key.clone()).filter(|k| !k.is_empty())),
        media_alt: Set(image.and_then(|m| m.alt.clone())),
        files: Set((!files.is_empty())
            .then(|| serde_json::to_value(&files).ok())
            .flatten()),
        active: Set(record.active),
        display_order: Set(record.display_order),
        category_id: Set(record.category_id),
        subcategory_id: Set(record.subcategory_id),
        schema_version: Set(CURRENT_SCHEMA_VERSION),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}

fn category_from_model(m: category::Model) -> Category {
    Category {
        id: m.id,
        name: m.name,
        slug: m.slug,
        created_at: m.created_at,
    }
}

fn subcategory_from_model(m: sub_category::Model) -> SubCategory {
    SubCategory {
        id: m.id,
        category_id: m.category_id,
        name: m.name,
        slug: m.slug,
        created_at: m.created_at,
    }
}

impl SeaOrmStore {
    async fn find_model(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Option<content_record::Model>, PersistenceError> {
        Ok(content_record::Entity::find_by_id(id)
            .filter(content_record::Column::Entity.eq(kind.as_str()))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl RecordStore for SeaOrmStore {
    async fn find(
        &self,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Option<ContentRecord>, PersistenceError> {
        self.find_model(kind, id)
            .await?
            .map(record_from_model)
            .transpose()
    }

    async fn find_by_slug(
        &self,
        kind: EntityKind,
        slug: &str,
    ) -> Result<Option<ContentRecord>, PersistenceError> {
        content_record::Entity::find()
            .filter(content_record::Column::Entity.eq(kind.as_str()))
            .filter(content_record::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .map(record_from_model)
            .transpose()
    }

    async fn list(
        &self,
        kind: EntityKind,
        query: &RecordQuery,
    ) -> Result<Vec<ContentRecord>, PersistenceError> {
        let mut select =
            content_record::Entity::find().filter(content_record::Column::Entity.eq(kind.as_str()));

        if query.active_only {
            select = select.filter(content_record::Column::Active.eq(true));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(content_record::Column::CategoryId.eq(category_id));
        }
        if let Some(subcategory_id) = query.subcategory_id {
            select = select.filter(content_record::Column::SubcategoryId.eq(subcategory_id));
        }

        select
            .all(&self.db)
            .await?
            .into_iter()
            .map(record_from_model)
            .collect()
    }

    async fn insert(&self, record: &ContentRecord) -> Result<(), PersistenceError> {
        content_record::Entity::insert(active_model_from_record(record))
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn update(&self, record: &ContentRecord) -> Result<bool, PersistenceError> {
        let mut active = active_model_from_record(record);
        // The discriminator and creation time never change.
        active.entity = NotSet;
        active.created_at = NotSet;

        let result = content_record::Entity::update_many()
            .set(active)
            .filter(content_record::Column::Id.eq(record.id))
            .filter(content_record::Column::Entity.eq(record.kind.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn set_active(
        &self,
        kind: EntityKind,
        id: Uuid,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>, PersistenceError> {
        let result = content_record::Entity::update_many()
            .col_expr(content_record::Column::Active, Expr::value(active))
            .col_expr(content_record::Column::UpdatedAt, Expr::value(at))
            .filter(content_record::Column::Id.eq(id))
            .filter(content_record::Column::Entity.eq(kind.as_str()))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find(kind, id).await
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, PersistenceError> {
        let result = content_record::Entity::delete_many()
            .filter(content_record::Column::Id.eq(id))
            .filter(content_record::Column::Entity.eq(kind.as_str()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn slug_exists(
        &self,
        kind: EntityKind,
        slug: &str,
        except: Option<Uuid>,
    ) -> Result<bool, PersistenceError> {
        let mut select = content_record::Entity::find()
            .filter(content_record::Column::Entity.eq(kind.as_str()))
            .filter(content_record::Column::Slug.eq(slug));
        if let Some(id) = except {
            select = select.filter(content_record::Column::Id.ne(id));
        }
        Ok(select.count(&self.db).await? > 0)
    }

    async fn count_in_category(&self, category_id: Uuid) -> Result<u64, PersistenceError> {
        Ok(content_record::Entity::find()
            .filter(content_record::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await?)
    }

    async fn count_in_subcategory(&self, subcategory_id: Uuid) -> Result<u64, PersistenceError> {
        Ok(content_record::Entity::find()
            .filter(content_record::Column::SubcategoryId.eq(subcategory_id))
            .count(&self.db)
            .await?)
    }
}

#[async_trait]
impl CategoryStore for SeaOrmStore {
    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(category_from_model)
            .collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, PersistenceError> {
        Ok(category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(category_from_model))
    }

    async fn insert_category(&self, c: &Category) -> Result<(), PersistenceError> {
        let model = category::ActiveModel {
            id: Set(c.id),
            name: Set(c.name.clone()),
            slug: Set(c.slug.clone()),
            created_at: Set(c.created_at),
        };
        category::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let result = category::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<SubCategory>, PersistenceError> {
        let mut select = sub_category::Entity::find();
        if let Some(category_id) = category_id {
            select = select.filter(sub_category::Column::CategoryId.eq(category_id));
        }
        Ok(select
            .order_by_asc(sub_category::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(subcategory_from_model)
            .collect())
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<SubCategory>, PersistenceError> {
        Ok(sub_category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(subcategory_from_model))
    }

    async fn insert_subcategory(&self, s: &SubCategory) -> Result<(), PersistenceError> {
        let model = sub_category::ActiveModel {
            id: Set(s.id),
            category_id: Set(s.category_id),
            name: Set(s.name.clone()),
            slug: Set(s.slug.clone()),
            created_at: Set(s.created_at),
        };
        sub_category::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let result = sub_category::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
