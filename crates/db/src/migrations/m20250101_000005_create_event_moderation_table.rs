//! Create event moderation log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventModeration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventModeration::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventModeration::EventId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventModeration::UserId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventModeration::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(EventModeration::Comment).text())
                    .col(
                        ColumnDef::new(EventModeration::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_moderation_event")
                            .from(EventModeration::Table, EventModeration::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (event_id, created_at) - latest entry lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_event_moderation_event_created")
                    .table(EventModeration::Table)
                    .col(EventModeration::EventId)
                    .col(EventModeration::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventModeration::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventModeration {
    Table,
    Id,
    EventId,
    UserId,
    Status,
    Comment,
    CreatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}
