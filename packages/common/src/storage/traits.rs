use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed object storage.
///
/// Implementations only move bytes. Key generation and best-effort cleanup
/// live in [`StorageGateway`](super::StorageGateway).
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `data` under `key`. A reader must never observe a partial object.
    async fn put_object(&self, key: &str, data: &[u8], content_type: &str)
    -> Result<(), StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete the object stored under `key`.
    ///
    /// Returns `true` if an object was deleted, `false` if it did not exist.
    async fn delete_object(&self, key: &str) -> Result<bool, StorageError>;

    /// Public address at which `key` is served.
    fn public_url(&self, key: &str) -> String;
}
