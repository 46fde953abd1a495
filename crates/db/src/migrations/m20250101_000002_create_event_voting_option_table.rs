//! Create event voting option table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventVotingOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventVotingOption::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventVotingOption::EventId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventVotingOption::Date).date().not_null())
                    .col(ColumnDef::new(EventVotingOption::StartTime).time().not_null())
                    .col(ColumnDef::new(EventVotingOption::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(EventVotingOption::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_voting_option_event")
                            .from(EventVotingOption::Table, EventVotingOption::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one slot per (date, start, end) within an event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_voting_option_slot")
                    .table(EventVotingOption::Table)
                    .col(EventVotingOption::EventId)
                    .col(EventVotingOption::Date)
                    .col(EventVotingOption::StartTime)
                    .col(EventVotingOption::EndTime)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // The winning slot is cleared if the option ever disappears
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_event_final_voting_option")
                    .from(Event::Table, Event::FinalVotingOptionId)
                    .to(EventVotingOption::Table, EventVotingOption::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_event_final_voting_option")
                    .table(Event::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(EventVotingOption::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventVotingOption {
    Table,
    Id,
    EventId,
    Date,
    StartTime,
    EndTime,
    CreatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    FinalVotingOptionId,
}
