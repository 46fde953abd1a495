//! Create event table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(Event::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::Tags).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Event::Image).string_len(512).not_null())
                    .col(ColumnDef::new(Event::Location).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Event::AllowVoting)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Event::Date).date())
                    .col(ColumnDef::new(Event::StartTime).time())
                    .col(ColumnDef::new(Event::EndTime).time())
                    .col(ColumnDef::new(Event::VotingEndDate).date())
                    .col(ColumnDef::new(Event::VotingEndTime).time())
                    // FK added once event_voting_option exists
                    .col(ColumnDef::new(Event::FinalVotingOptionId).string_len(32))
                    .col(ColumnDef::new(Event::Status).string_len(32))
                    .col(ColumnDef::new(Event::RecordingLink).string_len(512))
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Event::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_user_id")
                    .table(Event::Table)
                    .col(Event::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_status")
                    .table(Event::Table)
                    .col(Event::Status)
                    .to_owned(),
            )
            .await?;

        // Finalization scans voting events by deadline
        manager
            .create_index(
                Index::create()
                    .name("idx_event_voting_deadline")
                    .table(Event::Table)
                    .col(Event::VotingEndDate)
                    .col(Event::VotingEndTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_created_at")
                    .table(Event::Table)
                    .col(Event::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Tag containment filter (tags @> '["x"]')
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_event_tags
                ON event
                USING GIN (tags);
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Tags,
    Image,
    Location,
    AllowVoting,
    Date,
    StartTime,
    EndTime,
    VotingEndDate,
    VotingEndTime,
    FinalVotingOptionId,
    Status,
    RecordingLink,
    CreatedAt,
    UpdatedAt,
}
