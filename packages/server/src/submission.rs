//! Decoding of admin form submissions against an entity manifest.
//!
//! A submission is a flat map of wire keys to values. Multipart forms deliver
//! every value as a string; JSON bodies may use native types. Both decode to
//! the same [`DecodedFields`], which only contains what the caller actually
//! sent so that updates can coalesce omitted fields to their stored values.

use std::collections::BTreeMap;

use cms_common::localized::{self, LocalizedPatch};
use cms_common::storage::MediaUpload;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::lifecycle::ManagerError;
use crate::manifest::{EntityManifest, FieldKind, FieldSpec, IMAGE_SLOT};
use crate::record::{PlainValue, slugify};

/// Raw record submission as received over HTTP.
#[derive(Debug, Clone, Default)]
pub struct RecordSubmission {
    pub fields: Map<String, Value>,
    /// Uploaded files keyed by form part name.
    pub media: BTreeMap<String, MediaUpload>,
}

impl RecordSubmission {
    pub fn from_json(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            media: BTreeMap::new(),
        }
    }

    /// Attach `media` as the record's image.
    pub fn with_media(self, media: MediaUpload) -> Self {
        self.with_file(IMAGE_SLOT, media)
    }

    pub fn with_file(mut self, slot: &str, media: MediaUpload) -> Self {
        self.media.insert(slot.to_string(), media);
        self
    }
}

/// The submitted subset of a record, typed per the manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFields {
    pub localized: BTreeMap<String, LocalizedPatch>,
    pub plain: BTreeMap<String, PlainValue>,
    pub slug: Option<String>,
    pub active: Option<bool>,
    pub display_order: Option<i32>,
    /// `Some(None)` clears the reference.
    pub category: Option<Option<Uuid>>,
    pub subcategory: Option<Option<Uuid>>,
    pub image_alt: Option<String>,
}

/// Decode `fields` against `manifest`. Unknown keys are ignored.
pub fn decode(
    manifest: &EntityManifest,
    fields: &Map<String, Value>,
) -> Result<DecodedFields, ManagerError> {
    let mut decoded = DecodedFields::default();

    for spec in manifest.fields {
        match spec.kind {
            FieldKind::Localized => {
                let patch = localized_patch(spec.name, fields)?;
                if !patch.is_empty() {
                    decoded.localized.insert(spec.name.to_string(), patch);
                }
            }
            _ => {
                if let Some(raw) = fields.get(spec.name)
                    && let Some(value) = plain_value(spec, raw)?
                {
                    decoded.plain.insert(spec.name.to_string(), value);
                }
            }
        }
    }

    if let Some(raw) = non_blank(fields.get("slug")) {
        let slug = slugify(&raw);
        if slug.is_empty() {
            return Err(ManagerError::Validation(
                "slug must contain letters or digits".into(),
            ));
        }
        decoded.slug = Some(slug);
    }

    if let Some(raw) = fields.get("active") {
        decoded.active = parse_bool("active", raw)?;
    }

    if manifest.display_order
        && let Some(raw) = fields.get("displayOrder")
    {
        decoded.display_order = parse_integer("displayOrder", raw)?
            .map(|n| {
                i32::try_from(n).map_err(|_| {
                    ManagerError::Validation("displayOrder is out of range".into())
                })
            })
            .transpose()?;
    }

    if let Some(raw) = fields.get("category") {
        decoded.category = Some(parse_reference("category", raw)?);
    }
    if let Some(raw) = fields.get("subCategory") {
        decoded.subcategory = Some(parse_reference("subCategory", raw)?);
    }

    if let Some(raw) = fields.get("imageAlt") {
        decoded.image_alt = match raw {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        };
    }

    Ok(decoded)
}

/// Combined `{field}` value first, then split `{field}En` / `{field}Hi` parts.
///
/// A repeated form key arrives as an array and is rejected rather than
/// stored as its JSON text.
fn localized_patch(name: &str, fields: &Map<String, Value>) -> Result<LocalizedPatch, ManagerError> {
    let combined = match fields.get(name) {
        Some(Value::Array(_)) => return Err(invalid(name, "must be a single value")),
        Some(raw) => localized::decode_patch(raw),
        None => LocalizedPatch::default(),
    };

    let split_value = |suffixes: [&str; 2]| -> Result<Option<String>, ManagerError> {
        let Some((key, raw)) = suffixes.iter().find_map(|suffix| {
            let key = format!("{name}{suffix}");
            fields.get(&key).map(|raw| (key, raw))
        }) else {
            return Ok(None);
        };
        match raw {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(invalid(&key, "must be a single value")),
            other => Ok(Some(other.to_string())),
        }
    };
    let split = LocalizedPatch {
        en: split_value(["En", "EN"])?,
        hi: split_value(["Hi", "HI"])?,
    };

    Ok(combined.or(split))
}

/// `Ok(None)` means the field counts as not submitted.
fn plain_value(spec: &FieldSpec, raw: &Value) -> Result<Option<PlainValue>, ManagerError> {
    let name = spec.name;
    let value = match spec.kind {
        FieldKind::Text => match raw {
            Value::Null => None,
            Value::String(s) => Some(PlainValue::Text(s.trim().to_string())),
            Value::Number(n) => Some(PlainValue::Text(n.to_string())),
            Value::Bool(b) => Some(PlainValue::Text(b.to_string())),
            _ => return Err(invalid(name, "must be text")),
        },
        FieldKind::Integer => parse_integer(name, raw)?.map(PlainValue::Integer),
        FieldKind::Number => parse_number(name, raw)?.map(PlainValue::Number),
        FieldKind::Bool => parse_bool(name, raw)?.map(PlainValue::Bool),
        FieldKind::List => parse_list(name, raw)?.map(PlainValue::List),
        FieldKind::Localized => None,
    };

    if !spec.allowed.is_empty()
        && let Some(PlainValue::Text(text)) = &value
        && !spec.allowed.contains(&text.as_str())
    {
        return Err(invalid(
            name,
            &format!("must be one of {}", spec.allowed.join(", ")),
        ));
    }
    Ok(value)
}

fn invalid(name: &str, reason: &str) -> ManagerError {
    ManagerError::Validation(format!("{name} {reason}"))
}

fn non_blank(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_integer(name: &str, raw: &Value) -> Result<Option<i64>, ManagerError> {
    match raw {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(name, "must be an integer")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(name, "must be an integer")),
        _ => Err(invalid(name, "must be an integer")),
    }
}

fn parse_number(name: &str, raw: &Value) -> Result<Option<f64>, ManagerError> {
    let n = match raw {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(invalid(name, "must be a number")),
    }
}

fn parse_bool(name: &str, raw: &Value) -> Result<Option<bool>, ManagerError> {
    match raw {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "on" | "yes" => Ok(Some(true)),
            "false" | "0" | "off" | "no" => Ok(Some(false)),
            _ => Err(invalid(name, "must be true or false")),
        },
        _ => Err(invalid(name, "must be true or false")),
    }
}

/// Accepts a JSON array, a JSON-encoded array string, or a comma separated string.
fn parse_list(name: &str, raw: &Value) -> Result<Option<Vec<String>>, ManagerError> {
    let items = match raw {
        Value::Null => return Ok(None),
        Value::Array(items) => items.clone(),
        Value::String(s) if s.trim_start().starts_with('[') => {
            match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => items,
                _ => return Err(invalid(name, "must be a list")),
            }
        }
        Value::String(s) => s
            .split(',')
            .map(|item| Value::String(item.to_string()))
            .collect(),
        _ => return Err(invalid(name, "must be a list")),
    };

    let list = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect();
    Ok(Some(list))
}

fn parse_reference(name: &str, raw: &Value) -> Result<Option<Uuid>, ManagerError> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(|_| invalid(name, "must be a valid id")),
        _ => Err(invalid(name, "must be a valid id")),
    }
}
