use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per content record of any entity type.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_record")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Entity type path name (e.g. "blogs", "current-affairs").
    #[sea_orm(indexed)]
    pub entity: String,

    pub slug: Option<String>,

    /// `{field: {en, hi}}`. Legacy rows may hold bare strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub localized: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub fields: Json,

    pub media_url: Option<String>,

    /// Object store key; required to delete the media later.
    pub media_key: Option<String>,

    pub media_alt: Option<String>,

    /// Attachments other than the image, `{slot: {url, key}}`.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub files: Option<Json>,

    #[sea_orm(default_value = true)]
    pub active: bool,

    pub display_order: Option<i32>,

    #[sea_orm(indexed)]
    pub category_id: Option<Uuid>,

    pub subcategory_id: Option<Uuid>,

    pub schema_version: i32,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
