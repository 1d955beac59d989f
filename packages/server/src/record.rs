use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use cms_common::LocalizedText;
use cms_common::localized;
use cms_common::storage::MediaReference;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::manifest::{EntityKind, IMAGE_SLOT};

/// Version of the canonical record layout written by this build.
///
/// Version 1 records stored localized fields as bare strings.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// A non-localized field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum PlainValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl PlainValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PlainValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Canonical shape shared by every content entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub id: Uuid,
    pub kind: EntityKind,
    pub slug: Option<String>,
    pub localized: BTreeMap<String, LocalizedText>,
    pub plain: BTreeMap<String, PlainValue>,
    /// Stored files keyed by media slot.
    pub media: BTreeMap<String, MediaReference>,
    pub active: bool,
    pub display_order: Option<i32>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn localized_text(&self, field: &str) -> Option<&LocalizedText> {
        self.localized.get(field)
    }

    pub fn image(&self) -> Option<&MediaReference> {
        self.media.get(IMAGE_SLOT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Normalize stored localized fields, upgrading legacy single-string values.
pub fn localized_from_stored(stored: &Value) -> BTreeMap<String, LocalizedText> {
    match stored {
        Value::Object(map) => map
            .iter()
            .map(|(name, raw)| (name.clone(), localized::decode(raw)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

pub fn localized_to_stored(fields: &BTreeMap<String, LocalizedText>) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(name, text)| {
            (
                name.clone(),
                serde_json::json!({ "en": text.en, "hi": text.hi }),
            )
        })
        .collect();
    Value::Object(map)
}

/// Read plain fields back, keeping unknown shapes as their JSON text.
pub fn plain_from_stored(stored: &Value) -> BTreeMap<String, PlainValue> {
    let Value::Object(map) = stored else {
        return BTreeMap::new();
    };
    map.iter()
        .filter(|(_, raw)| !raw.is_null())
        .map(|(name, raw)| {
            let value = serde_json::from_value::<PlainValue>(raw.clone())
                .unwrap_or_else(|_| PlainValue::Text(raw.to_string()));
            (name.clone(), value)
        })
        .collect()
}

pub fn plain_to_stored(fields: &BTreeMap<String, PlainValue>) -> Value {
    serde_json::to_value(fields).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Lowercase ASCII slug: alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
