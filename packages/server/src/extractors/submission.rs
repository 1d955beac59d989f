use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use cms_common::storage::MediaUpload;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::manifest::IMAGE_SLOT;
use crate::state::AppState;
use crate::submission::RecordSubmission;

/// Accepts `multipart/form-data` (text parts plus file parts such as `image`
/// or `fileEN`) or a JSON object.
///
/// A part is a file when it carries a file name. The `image` part is always
/// read as a file.
impl FromRequest<AppState> for RecordSubmission {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            read_multipart(multipart, state.config.storage.max_upload_size).await
        } else {
            let AppJson(fields) = AppJson::<Map<String, Value>>::from_request(req, state).await?;
            Ok(RecordSubmission::from_json(fields))
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    max_size: u64,
) -> Result<RecordSubmission, AppError> {
    let mut submission = RecordSubmission::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if field.file_name().is_some() || name == IMAGE_SLOT {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let declared = field
                .content_type()
                .filter(|ct| *ct != "application/octet-stream")
                .map(str::to_string);

            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
            {
                if (bytes.len() + chunk.len()) as u64 > max_size {
                    return Err(AppError::Validation(format!(
                        "File exceeds maximum size of {max_size} bytes"
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            // Browsers send an empty part when no file was chosen.
            if bytes.is_empty() && file_name.is_empty() {
                continue;
            }

            let mime_type = declared.unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
            if submission.media.contains_key(&name) {
                return Err(AppError::Validation(format!("Only one {name} file is accepted")));
            }
            submission.media.insert(
                name,
                MediaUpload {
                    bytes,
                    original_name: file_name,
                    mime_type,
                },
            );
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field {name}: {e}")))?;
        insert_form_value(&mut submission.fields, name, text);
    }

    Ok(submission)
}

/// Repeated keys collect into an array.
fn insert_form_value(fields: &mut Map<String, Value>, name: String, text: String) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(Value::String(text)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(text)]);
        }
        None => {
            fields.insert(name, Value::String(text));
        }
    }
}
