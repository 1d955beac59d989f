use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use cms_common::config::StorageAppConfig;
use cms_common::storage::StorageGateway;
use cms_common::storage::filesystem::FilesystemMediaStore;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tempfile::TempDir;

use cms_server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use cms_server::lifecycle::ContentManager;
use cms_server::mailer::Mailer;
use cms_server::state::AppState;
use cms_server::store::MemoryStore;

/// Upload cap used by every test server.
pub const MAX_UPLOAD_SIZE: u64 = 64 * 1024;

pub mod routes {
    pub const CATEGORIES: &str = "/api/admin/categories";
    pub const SUBCATEGORIES: &str = "/api/admin/subcategories";
    pub const CONTACT: &str = "/api/public/contact";
    pub const SETTINGS: &str = "/api/admin/settings";
    pub const RESULT_SECTION: &str = "/api/admin/result-section";
    pub const PUBLIC_SETTINGS: &str = "/api/public/settings";
    pub const PUBLIC_RESULT_SECTION: &str = "/api/public/result-section";

    pub fn admin(entity: &str) -> String {
        format!("/api/admin/{entity}")
    }

    pub fn admin_record(entity: &str, id: &str) -> String {
        format!("/api/admin/{entity}/{id}")
    }

    pub fn public(entity: &str) -> String {
        format!("/api/public/{entity}")
    }

    pub fn public_record(entity: &str, id: &str) -> String {
        format!("/api/public/{entity}/{id}")
    }

    pub fn category(id: &str) -> String {
        format!("/api/admin/categories/{id}")
    }

    pub fn subcategory(id: &str) -> String {
        format!("/api/admin/subcategories/{id}")
    }
}

/// A running test server backed by the in-memory store and a temporary
/// media directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    media_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// A file part for multipart requests.
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub mime: &'a str,
    pub bytes: Vec<u8>,
}

impl<'a> FilePart<'a> {
    pub fn jpeg(file_name: &'a str) -> Self {
        Self {
            file_name,
            mime: "image/jpeg",
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'],
        }
    }

    pub fn pdf(file_name: &'a str) -> Self {
        Self {
            file_name,
            mime: "application/pdf",
            bytes: b"%PDF-1.4\n%%EOF\n".to_vec(),
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let media_dir = TempDir::new().expect("Failed to create media dir");

        let storage = StorageAppConfig {
            path: media_dir.path().to_path_buf(),
            max_upload_size: MAX_UPLOAD_SIZE,
            ..Default::default()
        };
        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: "memory://".to_string(),
            },
            storage,
            mail: None,
        };

        let media = FilesystemMediaStore::new(
            app_config.storage.path.clone(),
            "/media",
            MAX_UPLOAD_SIZE,
        )
        .await
        .expect("Failed to create media store");

        let store = Arc::new(MemoryStore::new());
        let manager = ContentManager::new(
            store.clone(),
            store.clone(),
            StorageGateway::new(Arc::new(media)),
            MAX_UPLOAD_SIZE,
        );

        let state = AppState {
            config: app_config,
            records: store.clone(),
            categories: store,
            manager,
            mailer: Mailer::disabled(),
        };

        let app = cms_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            media_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Whether an object with this key exists in the media directory.
    pub fn media_exists(&self, key: &str) -> bool {
        self.media_dir.path().join(Path::new(key)).is_file()
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// POST a multipart form with text parts and an optional `image` file.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<FilePart<'_>>,
    ) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(build_form(fields, file.map(|f| ("image", f)).into_iter().collect()))
            .send()
            .await
            .expect("Failed to send multipart POST request");

        TestResponse::from_response(res).await
    }

    /// PUT a multipart form with text parts and an optional `image` file.
    pub async fn put_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<FilePart<'_>>,
    ) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .multipart(build_form(fields, file.map(|f| ("image", f)).into_iter().collect()))
            .send()
            .await
            .expect("Failed to send multipart PUT request");

        TestResponse::from_response(res).await
    }

    /// POST a multipart form with text parts and named file parts.
    pub async fn post_files(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: Vec<(&str, FilePart<'_>)>,
    ) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(build_form(fields, files))
            .send()
            .await
            .expect("Failed to send multipart POST request");

        TestResponse::from_response(res).await
    }

    /// PUT a multipart form with text parts and named file parts.
    pub async fn put_files(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: Vec<(&str, FilePart<'_>)>,
    ) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .multipart(build_form(fields, files))
            .send()
            .await
            .expect("Failed to send multipart PUT request");

        TestResponse::from_response(res).await
    }

    /// Create a category via the API and return its `id`.
    pub async fn create_category(&self, name: &str) -> String {
        let res = self
            .post(routes::CATEGORIES, &serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, 201, "create_category failed: {}", res.text);
        res.id()
    }

    /// Create a testimonial with a photo and return its `id`.
    pub async fn create_testimonial(&self, name_en: &str) -> String {
        let name = serde_json::json!({ "en": name_en, "hi": "" }).to_string();
        let res = self
            .post_form(
                &routes::admin("testimonials"),
                &[("name", &name)],
                Some(FilePart::jpeg("photo.jpg")),
            )
            .await;
        assert_eq!(res.status, 201, "create_testimonial failed: {}", res.text);
        res.id()
    }
}

fn build_form(fields: &[(&str, &str)], files: Vec<(&str, FilePart<'_>)>) -> Form {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    for (slot, file) in files {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.to_string())
            .mime_str(file.mime)
            .expect("Failed to set MIME type");
        form = form.part(slot.to_string(), part);
    }
    form
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response body should contain 'id'")
            .to_string()
    }

    /// Assert the standard error envelope with the given code.
    pub fn assert_error(&self, status: u16, code: &str) {
        assert_eq!(self.status, status, "unexpected status: {}", self.text);
        assert_eq!(self.body["code"], code, "unexpected body: {}", self.text);
        assert!(
            self.body["error"].is_string(),
            "error message missing: {}",
            self.text
        );
    }
}
