use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_listings_table;
mod m20250301_000003_create_listing_images_table;
mod m20250301_000004_create_flagged_content_table;
mod m20250301_000005_create_admin_actions_table;
mod m20250301_000006_create_notifications_table;
mod m20250301_000007_create_saved_searches_table;
mod m20250301_000008_create_refresh_tokens;
mod m20250301_000009_add_search_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_listings_table::Migration),
            Box::new(m20250301_000003_create_listing_images_table::Migration),
            Box::new(m20250301_000004_create_flagged_content_table::Migration),
            Box::new(m20250301_000005_create_admin_actions_table::Migration),
            Box::new(m20250301_000006_create_notifications_table::Migration),
            Box::new(m20250301_000007_create_saved_searches_table::Migration),
            Box::new(m20250301_000008_create_refresh_tokens::Migration),
            Box::new(m20250301_000009_add_search_indexes::Migration),
        ]
    }
}
