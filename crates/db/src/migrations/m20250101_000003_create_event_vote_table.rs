//! Create event vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventVote::EventId).string_len(32).not_null())
                    .col(ColumnDef::new(EventVote::UserId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(EventVote::VotingOptionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_vote_event")
                            .from(EventVote::Table, EventVote::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_vote_option")
                            .from(EventVote::Table, EventVote::VotingOptionId)
                            .to(EventVotingOption::Table, EventVotingOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (event_id, user_id). Not unique: a user holds one vote
        // row per chosen slot, replaced as a whole on resubmission.
        manager
            .create_index(
                Index::create()
                    .name("idx_event_vote_event_user")
                    .table(EventVote::Table)
                    .col(EventVote::EventId)
                    .col(EventVote::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: voting_option_id (for tallies)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_vote_option_id")
                    .table(EventVote::Table)
                    .col(EventVote::VotingOptionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventVote {
    Table,
    Id,
    EventId,
    UserId,
    VotingOptionId,
    CreatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}

#[derive(Iden)]
enum EventVotingOption {
    Table,
    Id,
}
