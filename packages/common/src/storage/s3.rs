use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::filesystem::validate_key;
use super::traits::MediaStore;
use crate::config::S3Config;

/// S3-compatible object store (AWS S3, MinIO, R2, ...).
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    public_base_url: String,
    max_size: u64,
}

impl S3MediaStore {
    pub fn new(
        config: &S3Config,
        public_base_url: Option<&str>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let region = match config.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.to_string(),
            },
            _ => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        let public_base_url = match public_base_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => default_public_base(config),
        };

        Ok(Self {
            bucket,
            public_base_url,
            max_size,
        })
    }
}

fn default_public_base(config: &S3Config) -> String {
    match config.endpoint.as_deref() {
        Some(endpoint) if !endpoint.is_empty() => {
            format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket)
        }
        _ => format!(
            "https://{}.s3.{}.amazonaws.com",
            config.bucket, config.region
        ),
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match response.status_code() {
            200..=299 => Ok(()),
            code => Err(StorageError::Backend(format!(
                "put {key} returned HTTP {code}"
            ))),
        }
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match response.status_code() {
            200..=299 => Ok(response.bytes().to_vec()),
            404 => Err(StorageError::NotFound(key.to_string())),
            code => Err(StorageError::Backend(format!(
                "get {key} returned HTTP {code}"
            ))),
        }
    }

    async fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        // S3 answers 204 whether or not the key existed.
        match response.status_code() {
            200..=299 => Ok(true),
            404 => Ok(false),
            code => Err(StorageError::Backend(format!(
                "delete {key} returned HTTP {code}"
            ))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
