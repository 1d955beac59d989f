//! Create / update / status toggle / delete for every content entity.
//!
//! Ordering rules:
//! - All validation happens before any object store call.
//! - `update` with new media deletes the previous object of each replaced
//!   slot (best-effort), then uploads, then persists.
//! - `delete` removes media of every slot (best-effort) before the record.
//!
//! A crash between deleting the old object and persisting the new reference
//! during `update` leaves the record pointing at a deleted object. A crash
//! between the media delete and the record delete leaves nothing behind but
//! is not rolled back either.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use cms_common::LocalizedText;
use cms_common::storage::{MediaReference, MediaUpload, StorageError, StorageGateway};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::manifest::{
    CategoryRule, EntityKind, EntityManifest, FieldDefault, IMAGE_SLOT, MediaSlot, SlugRule,
};
use crate::record::{CURRENT_SCHEMA_VERSION, ContentRecord, PlainValue, slugify};
use crate::store::{CategoryStore, PersistenceError, RecordQuery, RecordStore};
use crate::submission::{self, DecodedFields, RecordSubmission};

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for ManagerError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Duplicate(detail) => {
                ManagerError::Conflict(format!("record already exists: {detail}"))
            }
            other => ManagerError::Persistence(other),
        }
    }
}

/// Orchestrates the codec, the storage gateway and the record store.
#[derive(Clone)]
pub struct ContentManager {
    records: Arc<dyn RecordStore>,
    categories: Arc<dyn CategoryStore>,
    storage: StorageGateway,
    max_upload_size: u64,
}

impl ContentManager {
    pub fn new(
        records: Arc<dyn RecordStore>,
        categories: Arc<dyn CategoryStore>,
        storage: StorageGateway,
        max_upload_size: u64,
    ) -> Self {
        Self {
            records,
            categories,
            storage,
            max_upload_size,
        }
    }

    pub fn records(&self) -> &dyn RecordStore {
        &*self.records
    }

    /// Resolve `id_or_slug`, trying it as an id first.
    #[instrument(skip(self), fields(entity = %kind))]
    pub async fn get(&self, kind: EntityKind, id_or_slug: &str) -> Result<ContentRecord, ManagerError> {
        if let Ok(id) = Uuid::parse_str(id_or_slug)
            && let Some(record) = self.records.find(kind, id).await?
        {
            return Ok(record);
        }
        self.records
            .find_by_slug(kind, id_or_slug)
            .await?
            .ok_or_else(|| not_found(kind, id_or_slug))
    }

    #[instrument(skip(self, submission), fields(entity = %kind, uploads = submission.media.len()))]
    pub async fn create(
        &self,
        kind: EntityKind,
        submission: RecordSubmission,
    ) -> Result<ContentRecord, ManagerError> {
        let manifest = kind.manifest();
        let decoded = submission::decode(manifest, &submission.fields)?;

        let localized = merge_localized(manifest, BTreeMap::new(), &decoded)?;
        let plain = merge_plain(manifest, BTreeMap::new(), &decoded, true)?;

        if let Some(missing) = manifest
            .media
            .iter()
            .find(|slot| slot.required && !submission.media.contains_key(slot.field))
        {
            return Err(ManagerError::Validation(format!("{} is required", missing.field)));
        }
        self.validate_media(manifest, &submission.media)?;

        let (category_id, subcategory_id) = self
            .resolve_categories(
                manifest,
                decoded.category.flatten(),
                decoded.subcategory.flatten(),
            )
            .await?;

        let slug = resolve_slug(manifest, decoded.slug.clone(), None, &localized)?;
        if let Some(slug) = &slug {
            self.ensure_unique_slug(kind, slug, None).await?;
        }

        let media = self
            .upload_all(manifest, &submission.media, decoded.image_alt.clone())
            .await?;

        let now = Utc::now();
        let record = ContentRecord {
            id: Uuid::now_v7(),
            kind,
            slug,
            localized,
            plain,
            media,
            active: decoded.active.unwrap_or(true),
            display_order: decoded.display_order,
            category_id,
            subcategory_id,
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.records.insert(&record).await {
            self.discard_fresh_uploads(record.media.values()).await;
            return Err(e.into());
        }

        info!(id = %record.id, "Created content record");
        Ok(record)
    }

    /// Full update with per-field coalescing: anything the submission omits
    /// keeps its stored value, including each locale of a localized field
    /// and each media slot.
    #[instrument(skip(self, submission), fields(entity = %kind, uploads = submission.media.len()))]
    pub async fn update(
        &self,
        kind: EntityKind,
        id_or_slug: &str,
        submission: RecordSubmission,
    ) -> Result<ContentRecord, ManagerError> {
        let existing = self.get(kind, id_or_slug).await?;
        self.update_existing(existing, id_or_slug, submission).await
    }

    async fn update_existing(
        &self,
        existing: ContentRecord,
        id_or_slug: &str,
        submission: RecordSubmission,
    ) -> Result<ContentRecord, ManagerError> {
        let kind = existing.kind;
        let manifest = kind.manifest();
        let decoded = submission::decode(manifest, &submission.fields)?;

        let localized = merge_localized(manifest, existing.localized.clone(), &decoded)?;
        let plain = merge_plain(manifest, existing.plain.clone(), &decoded, false)?;

        self.validate_media(manifest, &submission.media)?;

        let category = decoded.category.unwrap_or(existing.category_id);
        let subcategory = match decoded.subcategory {
            Some(sub) => sub,
            // A new category invalidates the old subcategory.
            None if category != existing.category_id => None,
            None => existing.subcategory_id,
        };
        let (category_id, subcategory_id) = self
            .resolve_categories(manifest, category, subcategory)
            .await?;

        let slug = resolve_slug(
            manifest,
            decoded.slug.clone(),
            existing.slug.clone(),
            &localized,
        )?;
        if let Some(slug) = &slug
            && existing.slug.as_ref() != Some(slug)
        {
            self.ensure_unique_slug(kind, slug, Some(existing.id)).await?;
        }

        let mut media = existing.media.clone();
        let previous_alt = existing.image().and_then(|image| image.alt.clone());
        for field in submission.media.keys() {
            if let Some(previous) = media.remove(field)
                && !previous.key.is_empty()
            {
                self.storage.delete(&previous.key).await;
            }
        }
        let fresh = self
            .upload_all(
                manifest,
                &submission.media,
                decoded.image_alt.clone().or(previous_alt),
            )
            .await?;
        if !fresh.contains_key(IMAGE_SLOT)
            && let Some(alt) = &decoded.image_alt
            && let Some(image) = media.get_mut(IMAGE_SLOT)
        {
            image.alt = Some(alt.clone()).filter(|a| !a.is_empty());
        }
        let fresh_keys: Vec<MediaReference> = fresh.values().cloned().collect();
        media.extend(fresh);

        let record = ContentRecord {
            slug,
            localized,
            plain,
            media,
            active: decoded.active.unwrap_or(existing.active),
            display_order: decoded.display_order.or(existing.display_order),
            category_id,
            subcategory_id,
            schema_version: CURRENT_SCHEMA_VERSION,
            updated_at: Utc::now(),
            ..existing
        };

        match self.records.update(&record).await {
            Ok(true) => {
                info!(id = %record.id, "Updated content record");
                Ok(record)
            }
            Ok(false) => {
                self.discard_fresh_uploads(&fresh_keys).await;
                Err(not_found(kind, id_or_slug))
            }
            Err(e) => {
                self.discard_fresh_uploads(&fresh_keys).await;
                Err(e.into())
            }
        }
    }

    /// The one record of a singleton entity.
    #[instrument(skip(self), fields(entity = %kind))]
    pub async fn get_singleton(&self, kind: EntityKind) -> Result<ContentRecord, ManagerError> {
        self.find_singleton(kind)
            .await?
            .ok_or_else(|| ManagerError::NotFound(format!("{kind} have not been saved yet")))
    }

    /// Update the singleton record in place, creating it on first save.
    #[instrument(skip(self, submission), fields(entity = %kind, uploads = submission.media.len()))]
    pub async fn upsert_singleton(
        &self,
        kind: EntityKind,
        submission: RecordSubmission,
    ) -> Result<ContentRecord, ManagerError> {
        match self.find_singleton(kind).await? {
            Some(existing) => {
                let id = existing.id.to_string();
                self.update_existing(existing, &id, submission).await
            }
            None => self.create(kind, submission).await,
        }
    }

    /// Earliest record wins if concurrent first saves created more than one.
    async fn find_singleton(&self, kind: EntityKind) -> Result<Option<ContentRecord>, ManagerError> {
        let records = self.records.list(kind, &RecordQuery::default()).await?;
        Ok(records
            .into_iter()
            .min_by_key(|record| (record.created_at, record.id)))
    }

    /// Toggle only the `active` flag.
    #[instrument(skip(self), fields(entity = %kind))]
    pub async fn set_active(
        &self,
        kind: EntityKind,
        id_or_slug: &str,
        active: bool,
    ) -> Result<ContentRecord, ManagerError> {
        let existing = self.get(kind, id_or_slug).await?;
        let record = self
            .records
            .set_active(kind, existing.id, active, Utc::now())
            .await?
            .ok_or_else(|| not_found(kind, id_or_slug))?;
        info!(id = %record.id, active, "Changed record status");
        Ok(record)
    }

    /// Remove the record's media, then the record.
    #[instrument(skip(self), fields(entity = %kind))]
    pub async fn delete(&self, kind: EntityKind, id_or_slug: &str) -> Result<(), ManagerError> {
        let existing = self.get(kind, id_or_slug).await?;

        for media in existing.media.values() {
            if !media.key.is_empty() {
                self.storage.delete(&media.key).await;
            }
        }

        if !self.records.delete(kind, existing.id).await? {
            return Err(not_found(kind, id_or_slug));
        }
        info!(id = %existing.id, "Deleted content record");
        Ok(())
    }

    fn validate_media(
        &self,
        manifest: &EntityManifest,
        uploads: &BTreeMap<String, MediaUpload>,
    ) -> Result<(), ManagerError> {
        for (field, upload) in uploads {
            let Some(slot) = manifest.media_slot(field) else {
                return Err(ManagerError::Validation(if manifest.media.is_empty() {
                    format!("{} records do not accept media", manifest.kind)
                } else {
                    format!("{} records have no {field} file", manifest.kind)
                }));
            };
            if upload.bytes.is_empty() {
                return Err(ManagerError::Validation(format!("{field} is empty")));
            }
            if !upload.mime_type.starts_with(slot.accepts) {
                return Err(ManagerError::Validation(format!(
                    "{field} must be {}, got {}",
                    slot.label(),
                    upload.mime_type
                )));
            }
            let size = upload.bytes.len() as u64;
            if size > self.max_upload_size {
                return Err(ManagerError::Validation(format!(
                    "{field} exceeds maximum size of {} bytes",
                    self.max_upload_size
                )));
            }
        }
        Ok(())
    }

    /// Upload every validated file. If one fails, the ones already stored
    /// by this call are removed again.
    async fn upload_all(
        &self,
        manifest: &EntityManifest,
        uploads: &BTreeMap<String, MediaUpload>,
        image_alt: Option<String>,
    ) -> Result<BTreeMap<String, MediaReference>, ManagerError> {
        let mut stored = BTreeMap::new();
        for slot in manifest.media {
            let Some(upload) = uploads.get(slot.field) else {
                continue;
            };
            let alt = (slot.field == IMAGE_SLOT).then(|| image_alt.clone()).flatten();
            match self.upload(slot, upload, alt).await {
                Ok(media) => {
                    stored.insert(slot.field.to_string(), media);
                }
                Err(e) => {
                    self.discard_fresh_uploads(stored.values()).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    async fn upload(
        &self,
        slot: &MediaSlot,
        upload: &MediaUpload,
        alt: Option<String>,
    ) -> Result<MediaReference, ManagerError> {
        let mut media = self
            .storage
            .upload(
                &upload.bytes,
                &upload.original_name,
                &upload.mime_type,
                slot.namespace,
            )
            .await?;
        media.alt = alt.filter(|a| !a.is_empty());
        Ok(media)
    }

    /// Remove objects uploaded by a request whose write failed.
    async fn discard_fresh_uploads<'a>(&self, media: impl IntoIterator<Item = &'a MediaReference>) {
        for media in media {
            warn!(key = %media.key, "Removing media of failed write");
            self.storage.delete(&media.key).await;
        }
    }

    async fn resolve_categories(
        &self,
        manifest: &EntityManifest,
        category: Option<Uuid>,
        subcategory: Option<Uuid>,
    ) -> Result<(Option<Uuid>, Option<Uuid>), ManagerError> {
        if manifest.category == CategoryRule::None {
            return Ok((None, None));
        }

        let category_id = match category {
            Some(id) => {
                if self.categories.find_category(id).await?.is_none() {
                    return Err(ManagerError::Validation(format!("category {id} does not exist")));
                }
                Some(id)
            }
            None if manifest.category == CategoryRule::Required => {
                return Err(ManagerError::Validation("category is required".into()));
            }
            None => None,
        };

        let subcategory_id = match subcategory {
            Some(id) if manifest.subcategory => {
                let sub = self.categories.find_subcategory(id).await?;
                match sub {
                    Some(sub) if Some(sub.category_id) == category_id => Some(id),
                    Some(_) => {
                        return Err(ManagerError::Validation(format!(
                            "subcategory {id} does not belong to the selected category"
                        )));
                    }
                    None => {
                        return Err(ManagerError::Validation(format!(
                            "subcategory {id} does not exist"
                        )));
                    }
                }
            }
            _ => None,
        };

        Ok((category_id, subcategory_id))
    }

    async fn ensure_unique_slug(
        &self,
        kind: EntityKind,
        slug: &str,
        except: Option<Uuid>,
    ) -> Result<(), ManagerError> {
        if self.records.slug_exists(kind, slug, except).await? {
            return Err(ManagerError::Conflict(format!(
                "a {kind} record with slug '{slug}' already exists"
            )));
        }
        Ok(())
    }
}

fn not_found(kind: EntityKind, id_or_slug: &str) -> ManagerError {
    ManagerError::NotFound(format!("{kind} record '{id_or_slug}' not found"))
}

/// Apply submitted patches over `stored`, then check required `en` values.
fn merge_localized(
    manifest: &EntityManifest,
    mut stored: BTreeMap<String, LocalizedText>,
    decoded: &DecodedFields,
) -> Result<BTreeMap<String, LocalizedText>, ManagerError> {
    for spec in manifest.localized_fields() {
        let text = stored.entry(spec.name.to_string()).or_default();
        if let Some(patch) = decoded.localized.get(spec.name) {
            text.apply(patch.clone());
        }
        if spec.required && text.is_blank() {
            return Err(ManagerError::Validation(format!(
                "{}.en is required",
                spec.name
            )));
        }
    }
    Ok(stored)
}

/// Overlay submitted plain values on `stored`. Defaults only apply on create.
fn merge_plain(
    manifest: &EntityManifest,
    mut stored: BTreeMap<String, PlainValue>,
    decoded: &DecodedFields,
    creating: bool,
) -> Result<BTreeMap<String, PlainValue>, ManagerError> {
    for spec in manifest.plain_fields() {
        if let Some(value) = decoded.plain.get(spec.name) {
            stored.insert(spec.name.to_string(), value.clone());
        } else if creating && let Some(default) = spec.default {
            let value = match default {
                FieldDefault::Text(s) => PlainValue::Text(s.to_string()),
                FieldDefault::Bool(b) => PlainValue::Bool(b),
            };
            stored.insert(spec.name.to_string(), value);
        }

        if spec.required {
            let present = match stored.get(spec.name) {
                Some(PlainValue::Text(s)) => !s.trim().is_empty(),
                Some(PlainValue::List(items)) => !items.is_empty(),
                Some(_) => true,
                None => false,
            };
            if !present {
                return Err(ManagerError::Validation(format!("{} is required", spec.name)));
            }
        }
    }
    Ok(stored)
}

fn resolve_slug(
    manifest: &EntityManifest,
    submitted: Option<String>,
    stored: Option<String>,
    localized: &BTreeMap<String, LocalizedText>,
) -> Result<Option<String>, ManagerError> {
    match manifest.slug {
        SlugRule::None => Ok(None),
        SlugRule::Required => submitted
            .or(stored)
            .map(Some)
            .ok_or_else(|| ManagerError::Validation("slug is required".into())),
        SlugRule::DerivedFrom(source) => {
            if let Some(slug) = submitted.or(stored) {
                return Ok(Some(slug));
            }
            let derived = localized
                .get(source)
                .map(|text| slugify(&text.en))
                .unwrap_or_default();
            if derived.is_empty() {
                return Err(ManagerError::Validation(format!(
                    "slug is required when {source}.en has no letters or digits"
                )));
            }
            Ok(Some(derived))
        }
    }
}
