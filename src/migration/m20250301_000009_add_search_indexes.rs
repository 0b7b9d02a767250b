use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Covers the public search path: active listings filtered by city,
        // newest first.
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_listings_active_city_created
             ON listings (status, city, created_at DESC)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_listings_active_price
             ON listings (status, price)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP INDEX IF EXISTS idx_listings_active_city_created")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_listings_active_price")
            .await?;

        Ok(())
    }
}
