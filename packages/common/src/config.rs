use std::path::PathBuf;

use serde::Deserialize;

/// Which object store backs uploaded media.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// App-level media storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Storage backend. Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend. Default: "./data/media".
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Base URL that public media addresses are built from.
    /// Default: "/media" for the filesystem backend; derived from the bucket for S3.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Maximum accepted upload size in bytes. Default: 10 MB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// S3 settings, required when `backend = "s3"`.
    #[serde(default)]
    pub s3: Option<S3Config>,
}

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services. Unset for AWS.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub path_style: bool,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/media")
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}
fn default_s3_region() -> String {
    "us-east-1".into()
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            public_base_url: None,
            max_upload_size: default_max_upload_size(),
            s3: None,
        }
    }
}
