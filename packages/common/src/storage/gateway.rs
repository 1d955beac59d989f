use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::StorageError;
use super::traits::MediaStore;

/// Handle to an uploaded media object.
///
/// `key` is what the object store needs to delete the object later. A record
/// that loses its `key` leaks the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MediaReference {
    /// Public address of the object.
    #[schema(example = "https://cdn.example.com/blogs/1718000000000-cover.jpg")]
    pub url: String,
    /// Object store key, `{namespace}/{timestamp}-{file name}`.
    #[schema(example = "blogs/1718000000000-cover.jpg")]
    pub key: String,
    /// Alternative text shown when the image cannot be rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A media file received with a submission, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub original_name: String,
    pub mime_type: String,
}

/// Uploads media under namespaced keys and cleans up replaced objects.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn MediaStore>,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Store `blob` under a fresh key in `namespace` and return its reference.
    ///
    /// The object is either fully stored or the call fails; no reference is
    /// handed out for a partial upload.
    pub async fn upload(
        &self,
        blob: &[u8],
        original_name: &str,
        mime_type: &str,
        namespace: &str,
    ) -> Result<MediaReference, StorageError> {
        let key = object_key(namespace, original_name, Utc::now().timestamp_millis())?;
        self.store.put_object(&key, blob, mime_type).await?;
        info!(key = %key, size = blob.len(), "Uploaded media object");

        Ok(MediaReference {
            url: self.store.public_url(&key),
            key,
            alt: None,
        })
    }

    /// Best-effort delete. Failures are logged and never reach the caller.
    pub async fn delete(&self, key: &str) {
        match self.store.delete_object(key).await {
            Ok(true) => info!(key = %key, "Deleted media object"),
            Ok(false) => info!(key = %key, "Media object already absent"),
            Err(e) => warn!(key = %key, error = %e, "Media cleanup failed"),
        }
    }
}

/// Build the object key `{namespace}/{timestamp}-{file name}`.
pub fn object_key(
    namespace: &str,
    original_name: &str,
    timestamp_ms: i64,
) -> Result<String, StorageError> {
    let namespace = namespace.trim_matches('/');
    let valid_namespace = !namespace.is_empty()
        && namespace.split('/').all(|seg| {
            !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        });
    if !valid_namespace {
        return Err(StorageError::InvalidKey(format!(
            "invalid namespace: {namespace:?}"
        )));
    }

    Ok(format!(
        "{namespace}/{timestamp_ms}-{}",
        sanitize_file_name(original_name)
    ))
}

/// Reduce an uploaded file name to a safe single key segment.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `-`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    let out = out.trim_start_matches(['.', '-']).trim_end_matches('-');
    if out.is_empty() {
        "upload".to_string()
    } else {
        out.to_string()
    }
}
