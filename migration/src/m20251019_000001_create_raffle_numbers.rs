use sea_orm_migration::prelude::*;

/// Raffle Numbers (每张票一条记录)
#[derive(DeriveIden)]
enum RaffleNumbers {
    Table,
    Id,
    EventId,
    Number,
    Range,
    Timestamp,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// number 以字符串保存 (与前端文档格式保持一致)，range 为创建时生效的上限，仅用于审计。
/// (event_id, number) 唯一索引让插入成为条件插入：并发抢同一号码时只有一个写入者成功。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RaffleNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RaffleNumbers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RaffleNumbers::EventId)
                            .string_len(64)
                            .not_null()
                            .default("default"),
                    )
                    .col(ColumnDef::new(RaffleNumbers::Number).string_len(16).not_null())
                    .col(ColumnDef::new(RaffleNumbers::Range).integer().not_null())
                    .col(
                        ColumnDef::new(RaffleNumbers::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // unique (event_id, number)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_raffle_numbers_event_number")
                    .table(RaffleNumbers::Table)
                    .col(RaffleNumbers::EventId)
                    .col(RaffleNumbers::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RaffleNumbers::Table).to_owned())
            .await?;
        Ok(())
    }
}
