use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use cms_common::config::StorageBackend;
use cms_common::storage::{StorageGateway, build_media_store};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cms_server::config::{AppConfig, CorsConfig};
use cms_server::lifecycle::ContentManager;
use cms_server::mailer::Mailer;
use cms_server::state::AppState;
use cms_server::store::{CategoryStore, MemoryStore, RecordStore, SeaOrmStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_server=info,cms_common=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::load()?;

    let (records, categories): (Arc<dyn RecordStore>, Arc<dyn CategoryStore>) =
        if config.database.is_memory() {
            warn!("Using the in-memory store; content is lost on restart");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        } else {
            let db = cms_server::database::init_db(&config.database.url).await?;
            info!("Database schema synced");
            cms_server::seed::ensure_indexes(&db).await?;
            let store = Arc::new(SeaOrmStore::new(db));
            (store.clone(), store)
        };

    let media_store = build_media_store(&config.storage).await?;
    info!(backend = ?config.storage.backend, "Media storage ready");

    let manager = ContentManager::new(
        records.clone(),
        categories.clone(),
        StorageGateway::new(media_store),
        config.storage.max_upload_size,
    );

    let mailer = Mailer::new(config.mail.clone())?;
    if !mailer.is_configured() {
        warn!("No mail relay configured; contact messages will only be logged");
    }

    let state = AppState {
        config: config.clone(),
        records,
        categories,
        manager,
        mailer,
    };

    let mut app = cms_server::build_router(state);

    // Uploaded files are served from disk unless a public base URL points elsewhere.
    if config.storage.backend == StorageBackend::Filesystem
        && config.storage.public_base_url.is_none()
    {
        app = app.nest_service("/media", ServeDir::new(&config.storage.path));
    }

    let app = app
        .layer(cors_layer(&config.server.cors))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(config.max_age))
}
