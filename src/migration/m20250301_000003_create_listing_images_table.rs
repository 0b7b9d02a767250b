use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ListingImages {
    Table,
    Id,
    ListingId,
    Url,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ListingImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ListingImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ListingImages::ListingId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ListingImages::Url).string().not_null())
                    .col(ColumnDef::new(ListingImages::Position).integer().not_null())
                    .col(
                        ColumnDef::new(ListingImages::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_images_listing_id")
                            .from(ListingImages::Table, ListingImages::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listing_images_listing")
                    .table(ListingImages::Table)
                    .col(ListingImages::ListingId)
                    .col(ListingImages::Position)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ListingImages::Table).to_owned())
            .await
    }
}
