use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SourceSettings::Table)
                    .if_not_exists()
                    .col(uuid(SourceSettings::SourceId))
                    .col(string(SourceSettings::Key))
                    .col(text(SourceSettings::Value))
                    .col(timestamp_with_time_zone(SourceSettings::UpdatedAt))
                    .primary_key(
                        Index::create()
                            .name("pk_source_settings")
                            .col(SourceSettings::SourceId)
                            .col(SourceSettings::Key),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SourceSettings::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum SourceSettings {
    Table,
    SourceId,
    Key,
    Value,
    UpdatedAt,
}
