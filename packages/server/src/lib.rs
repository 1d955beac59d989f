pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod listing;
pub mod mailer;
pub mod manifest;
pub mod models;
pub mod record;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;
pub mod submission;

use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coaching Institute Content API",
        version = "1.0.0",
        description = "Bilingual (English/Hindi) content records for the institute website"
    ),
    tags(
        (name = "Content", description = "Admin CRUD for content records of every entity type"),
        (name = "Categories", description = "Categories and subcategories used to group records"),
        (name = "Site", description = "Web settings and the results section block"),
        (name = "Public", description = "Active records, applications and the contact form"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
