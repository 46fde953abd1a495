//! Create engagement table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Engagement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Engagement::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Engagement::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Engagement::TargetId).string_len(64).not_null())
                    .col(ColumnDef::new(Engagement::UserId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Engagement::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (kind, target_id, user_id) - toggles are idempotent
        manager
            .create_index(
                Index::create()
                    .name("idx_engagement_kind_target_user")
                    .table(Engagement::Table)
                    .col(Engagement::Kind)
                    .col(Engagement::TargetId)
                    .col(Engagement::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's bookmarks and likes)
        manager
            .create_index(
                Index::create()
                    .name("idx_engagement_user_id")
                    .table(Engagement::Table)
                    .col(Engagement::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Engagement::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Engagement {
    Table,
    Id,
    Kind,
    TargetId,
    UserId,
    CreatedAt,
}
