use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchRecords::Username).string().not_null())
                    .col(ColumnDef::new(SearchRecords::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SearchRecords::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // One marker per searched username; a losing concurrent insert is a cache hit.
        manager
            .create_index(
                Index::create()
                    .name("idx_search_records_username_unique")
                    .table(SearchRecords::Table)
                    .col(SearchRecords::Username)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResultRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResultRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ResultRecords::SearchId).integer().not_null())
                    .col(
                        ColumnDef::new(ResultRecords::SourceUsername)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultRecords::SourceName).string().not_null())
                    .col(
                        ColumnDef::new(ResultRecords::SourceDescription)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultRecords::TargetHandle).string().not_null())
                    .col(ColumnDef::new(ResultRecords::TargetName).string().not_null())
                    .col(
                        ColumnDef::new(ResultRecords::TargetDescription)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultRecords::CreatedAt).string().not_null())
                    .col(ColumnDef::new(ResultRecords::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_result_records_search_id")
                            .from(ResultRecords::Table, ResultRecords::SearchId)
                            .to(SearchRecords::Table, SearchRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_result_records_search_id")
                    .table(ResultRecords::Table)
                    .col(ResultRecords::SearchId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResultRecords::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SearchRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchRecords {
    Table,
    Id,
    Username,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ResultRecords {
    Table,
    Id,
    SearchId,
    SourceUsername,
    SourceName,
    SourceDescription,
    TargetHandle,
    TargetName,
    TargetDescription,
    CreatedAt,
    UpdatedAt,
}
