//! Bilingual (English / Hindi) text values and their wire codec.
//!
//! Localized fields arrive in several shapes: a `{en, hi}` object, a JSON
//! string encoding that object, a bare legacy string, or a pair of split form
//! fields (`titleEn` / `titleHi`). Every shape decodes into a [`LocalizedPatch`]
//! that remembers which locales were actually submitted, so updates can keep
//! the stored value of any locale the caller left out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A text value stored once per supported language.
///
/// `en` is the primary locale. `hi` may be empty but is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LocalizedText {
    #[schema(example = "Foundation Batch")]
    pub en: String,
    #[serde(default)]
    #[schema(example = "फाउंडेशन बैच")]
    pub hi: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, hi: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            hi: hi.into(),
        }
    }

    /// `true` when the primary locale has no visible text.
    pub fn is_blank(&self) -> bool {
        self.en.trim().is_empty()
    }

    /// Overwrite the locales present in `patch`, keeping the rest.
    pub fn apply(&mut self, patch: LocalizedPatch) {
        if let Some(en) = patch.en {
            self.en = en;
        }
        if let Some(hi) = patch.hi {
            self.hi = hi;
        }
    }
}

/// The locales submitted for one localized field.
///
/// `None` means "not submitted", which is distinct from `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedPatch {
    pub en: Option<String>,
    pub hi: Option<String>,
}

impl LocalizedPatch {
    pub fn is_empty(&self) -> bool {
        self.en.is_none() && self.hi.is_none()
    }

    /// Fill locales missing from `self` with those in `fallback`.
    pub fn or(self, fallback: LocalizedPatch) -> LocalizedPatch {
        LocalizedPatch {
            en: self.en.or(fallback.en),
            hi: self.hi.or(fallback.hi),
        }
    }

    /// Materialize the patch, defaulting missing locales to `""`.
    pub fn into_text(self) -> LocalizedText {
        LocalizedText {
            en: self.en.unwrap_or_default(),
            hi: self.hi.unwrap_or_default(),
        }
    }
}

/// Decode any wire or stored representation into a full [`LocalizedText`].
///
/// Never fails. A string that is not a JSON-encoded `{en, hi}` object is taken
/// as legacy single-locale text and becomes the `en` value.
pub fn decode(raw: &Value) -> LocalizedText {
    decode_patch(raw).into_text()
}

/// Decode a raw value, keeping track of which locales were present.
pub fn decode_patch(raw: &Value) -> LocalizedPatch {
    match raw {
        Value::Null => LocalizedPatch::default(),
        Value::Object(map) => LocalizedPatch {
            en: map.get("en").and_then(locale_value),
            hi: map.get("hi").and_then(locale_value),
        },
        Value::String(s) => decode_str(s),
        other => LocalizedPatch {
            en: Some(other.to_string()),
            hi: None,
        },
    }
}

/// Decode a raw string as it would arrive in a form field.
pub fn decode_str(raw: &str) -> LocalizedPatch {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => LocalizedPatch {
            en: map.get("en").and_then(locale_value),
            hi: map.get("hi").and_then(locale_value),
        },
        // A JSON-encoded string is a legacy value that was double-encoded.
        Ok(Value::String(inner)) => decode_str(&inner),
        _ => LocalizedPatch {
            en: Some(raw.to_string()),
            hi: None,
        },
    }
}

/// Assemble a patch from split per-locale form fields.
pub fn from_split(en: Option<&str>, hi: Option<&str>) -> LocalizedPatch {
    LocalizedPatch {
        en: en.map(str::to_string),
        hi: hi.map(str::to_string),
    }
}

/// Serialize for wire transmission as a JSON string.
pub fn encode(value: &LocalizedText) -> String {
    serde_json::json!({ "en": value.en, "hi": value.hi }).to_string()
}

fn locale_value(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
