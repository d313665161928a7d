use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Permissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Permissions::ApiKey).string_len(255).not_null())
                    .col(ColumnDef::new(Permissions::Module).string_len(255).not_null())
                    .col(ColumnDef::new(Permissions::Action).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Permissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per grant; duplicate grants hit this and are ignored.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_permissions_grant")
                    .table(Permissions::Table)
                    .col(Permissions::ApiKey)
                    .col(Permissions::Module)
                    .col(Permissions::Action)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_permissions_api_key")
                    .table(Permissions::Table)
                    .col(Permissions::ApiKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    ApiKey,
    Module,
    Action,
    CreatedAt,
}
