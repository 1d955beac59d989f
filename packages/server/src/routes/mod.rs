use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{categories, public, records, singletons};
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/admin", admin_routes(config.storage.max_upload_size))
        .nest("/public", public_routes())
}

fn admin_routes(max_upload_size: u64) -> OpenApiRouter<AppState> {
    // Static segments win over `/{entity}` in the matcher.
    let taxonomy = OpenApiRouter::new()
        .routes(routes!(
            categories::list_categories,
            categories::create_category
        ))
        .routes(routes!(categories::delete_category))
        .routes(routes!(
            categories::list_subcategories,
            categories::create_subcategory
        ))
        .routes(routes!(categories::delete_subcategory));

    let content = OpenApiRouter::new()
        .routes(routes!(singletons::get_settings, singletons::save_settings))
        .routes(routes!(
            singletons::get_result_section,
            singletons::save_result_section
        ))
        .routes(routes!(records::list_records, records::create_record))
        .routes(routes!(
            records::get_record,
            records::update_record,
            records::set_record_active,
            records::delete_record
        ))
        .layer(records::record_body_limit(max_upload_size));

    taxonomy.merge(content)
}

fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(public::submit_contact))
        .routes(routes!(singletons::public_settings))
        .routes(routes!(singletons::public_result_section))
        .routes(routes!(public::list_public, public::submit_public))
        .routes(routes!(public::get_public))
}
