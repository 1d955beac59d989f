use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use cms_common::LocalizedText;
use cms_common::storage::MediaReference;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::Pagination;
use crate::manifest::{EntityKind, IMAGE_SLOT};
use crate::record::{Category, ContentRecord, PlainValue, SubCategory};

/// Resolved category or subcategory reference.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CategoryRef {
    pub id: Uuid,
    #[schema(example = "Polity")]
    pub name: String,
    #[schema(example = "polity")]
    pub slug: String,
}

/// Canonical shape of every content record.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: Uuid,
    pub entity: EntityKind,
    #[schema(example = "foundation-batch")]
    pub slug: Option<String>,
    /// Localized fields keyed by name, each `{en, hi}`.
    pub localized: BTreeMap<String, LocalizedText>,
    /// Non-localized fields keyed by name.
    pub fields: BTreeMap<String, PlainValue>,
    /// The record's image, if it has one.
    pub media: Option<MediaReference>,
    /// Other attached files keyed by form part name (e.g. `fileEN`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, MediaReference>,
    pub active: bool,
    pub display_order: Option<i32>,
    pub category: Option<CategoryRef>,
    pub sub_category: Option<CategoryRef>,
    #[schema(example = 2)]
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordResponse {
    pub fn new(record: ContentRecord, refs: &CategoryRefs) -> Self {
        let mut files = record.media;
        let media = files.remove(IMAGE_SLOT);
        Self {
            category: record.category_id.and_then(|id| refs.category(id)),
            sub_category: record.subcategory_id.and_then(|id| refs.subcategory(id)),
            id: record.id,
            entity: record.kind,
            slug: record.slug,
            localized: record.localized,
            fields: record.plain,
            media,
            files,
            active: record.active,
            display_order: record.display_order,
            schema_version: record.schema_version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Lookup table for resolving record category references at read time.
#[derive(Debug, Default)]
pub struct CategoryRefs {
    categories: HashMap<Uuid, CategoryRef>,
    subcategories: HashMap<Uuid, CategoryRef>,
}

impl CategoryRefs {
    pub fn new(categories: Vec<Category>, subcategories: Vec<SubCategory>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|c| {
                    (
                        c.id,
                        CategoryRef {
                            id: c.id,
                            name: c.name,
                            slug: c.slug,
                        },
                    )
                })
                .collect(),
            subcategories: subcategories
                .into_iter()
                .map(|s| {
                    (
                        s.id,
                        CategoryRef {
                            id: s.id,
                            name: s.name,
                            slug: s.slug,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn category(&self, id: Uuid) -> Option<CategoryRef> {
        self.categories.get(&id).cloned()
    }

    pub fn subcategory(&self, id: Uuid) -> Option<CategoryRef> {
        self.subcategories.get(&id).cloned()
    }

    /// Resolve a category given by id or slug.
    pub fn find_category(&self, id_or_slug: &str) -> Option<Uuid> {
        find_ref(&self.categories, id_or_slug)
    }

    pub fn find_subcategory(&self, id_or_slug: &str) -> Option<Uuid> {
        find_ref(&self.subcategories, id_or_slug)
    }
}

fn find_ref(refs: &HashMap<Uuid, CategoryRef>, id_or_slug: &str) -> Option<Uuid> {
    if let Ok(id) = Uuid::parse_str(id_or_slug)
        && refs.contains_key(&id)
    {
        return Some(id);
    }
    refs.values().find(|r| r.slug == id_or_slug).map(|r| r.id)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RecordListResponse {
    pub data: Vec<RecordResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Items per page, 1-100. Default: 20.
    pub per_page: Option<u64>,
    /// Only records with this status.
    pub active: Option<bool>,
}

/// Body of the status toggle.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}
