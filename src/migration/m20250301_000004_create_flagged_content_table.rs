use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum FlaggedContent {
    Table,
    Id,
    ListingId,
    Reason,
    FlaggedText,
    Reviewed,
    ReviewedBy,
    ReviewedAt,
    ActionTaken,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FlaggedContent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FlaggedContent::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FlaggedContent::ListingId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FlaggedContent::Reason).string().not_null())
                    .col(ColumnDef::new(FlaggedContent::FlaggedText).text().not_null())
                    .col(
                        ColumnDef::new(FlaggedContent::Reviewed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(FlaggedContent::ReviewedBy).integer().null())
                    .col(ColumnDef::new(FlaggedContent::ReviewedAt).timestamp().null())
                    .col(
                        ColumnDef::new(FlaggedContent::ActionTaken)
                            .string_len(20)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FlaggedContent::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flagged_content_listing_id")
                            .from(FlaggedContent::Table, FlaggedContent::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flagged_content_reviewed_by")
                            .from(FlaggedContent::Table, FlaggedContent::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_flagged_content_reviewed")
                    .table(FlaggedContent::Table)
                    .col(FlaggedContent::Reviewed)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FlaggedContent::Table).to_owned())
            .await
    }
}
