use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::content_record;

/// Ensure the content record indexes exist.
///
/// Schema sync only creates single-column indexes, so the composite ones are
/// created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Public listings: WHERE entity = ? AND active = true
    let listing = Index::create()
        .if_not_exists()
        .name("idx_content_record_entity_active")
        .table(content_record::Entity)
        .col(content_record::Column::Entity)
        .col(content_record::Column::Active)
        .to_owned();
    create_index(db, "idx_content_record_entity_active", listing).await;

    // Slugs are unique per entity type; NULL slugs do not collide.
    let slug = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_content_record_entity_slug")
        .table(content_record::Entity)
        .col(content_record::Column::Entity)
        .col(content_record::Column::Slug)
        .to_owned();
    create_index(db, "idx_content_record_entity_slug", slug).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: IndexCreateStatement) {
    let sql = stmt.to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}
