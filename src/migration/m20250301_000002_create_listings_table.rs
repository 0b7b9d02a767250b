use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Address,
    City,
    District,
    Latitude,
    Longitude,
    Price,
    PropertyType,
    Bedrooms,
    Bathrooms,
    AreaSqm,
    Furnished,
    ExpatFriendly,
    YoutubeUrl,
    Status,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
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
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listings::UserId).integer().not_null())
                    .col(ColumnDef::new(Listings::Title).string().not_null())
                    .col(ColumnDef::new(Listings::Description).text().not_null())
                    .col(ColumnDef::new(Listings::Address).string().not_null())
                    .col(ColumnDef::new(Listings::City).string().not_null())
                    .col(ColumnDef::new(Listings::District).string().null())
                    .col(ColumnDef::new(Listings::Latitude).double().not_null())
                    .col(ColumnDef::new(Listings::Longitude).double().not_null())
                    .col(ColumnDef::new(Listings::Price).double().not_null())
                    .col(
                        ColumnDef::new(Listings::PropertyType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::Bedrooms)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listings::Bathrooms)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Listings::AreaSqm).double().not_null())
                    .col(
                        ColumnDef::new(Listings::Furnished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listings::ExpatFriendly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Listings::YoutubeUrl).string().null())
                    .col(
                        ColumnDef::new(Listings::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Listings::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_user_id")
                            .from(Listings::Table, Listings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_status")
                    .table(Listings::Table)
                    .col(Listings::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_user_id")
                    .table(Listings::Table)
                    .col(Listings::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}
