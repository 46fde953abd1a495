//! Create event annex table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventAnnex::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventAnnex::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventAnnex::EventId).string_len(32).not_null())
                    .col(ColumnDef::new(EventAnnex::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(EventAnnex::AnnexedId).string_len(64).not_null())
                    .col(ColumnDef::new(EventAnnex::UserId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(EventAnnex::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_annex_event")
                            .from(EventAnnex::Table, EventAnnex::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: an item is annexed at most once per event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_annex_event_kind_item")
                    .table(EventAnnex::Table)
                    .col(EventAnnex::EventId)
                    .col(EventAnnex::Kind)
                    .col(EventAnnex::AnnexedId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (kind, annexed_id) - reverse lookup on deletion
        manager
            .create_index(
                Index::create()
                    .name("idx_event_annex_kind_item")
                    .table(EventAnnex::Table)
                    .col(EventAnnex::Kind)
                    .col(EventAnnex::AnnexedId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventAnnex::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventAnnex {
    Table,
    Id,
    EventId,
    Kind,
    AnnexedId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}
