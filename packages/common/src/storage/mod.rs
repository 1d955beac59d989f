mod error;
mod gateway;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use gateway::{MediaReference, MediaUpload, StorageGateway, object_key, sanitize_file_name};
pub use traits::MediaStore;

use crate::config::{StorageAppConfig, StorageBackend};

/// Build the configured object store.
pub async fn build_media_store(
    config: &StorageAppConfig,
) -> Result<Arc<dyn MediaStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let public_base = config.public_base_url.as_deref().unwrap_or("/media");
            let store = filesystem::FilesystemMediaStore::new(
                config.path.clone(),
                public_base,
                config.max_upload_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.s3 section is required for the s3 backend".into())
            })?;
            let store = s3::S3MediaStore::new(
                s3_config,
                config.public_base_url.as_deref(),
                config.max_upload_size,
            )?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "built without the object-storage feature".into(),
        )),
    }
}
