use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per year; the year is the key
        manager
            .create_table(
                Table::create()
                    .table(ThaiEppoConsumption::Table)
                    .if_not_exists()
                    .col(integer(ThaiEppoConsumption::Year).primary_key())
                    .col(decimal(ThaiEppoConsumption::ConsumptionKt).decimal_len(16, 4))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ThaiEppoConsumption::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ThaiEppoConsumption {
    Table,
    Year,
    ConsumptionKt,
}
