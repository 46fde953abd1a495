//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_event_table;
mod m20250101_000002_create_event_voting_option_table;
mod m20250101_000003_create_event_vote_table;
mod m20250101_000004_create_engagement_table;
mod m20250101_000005_create_event_moderation_table;
mod m20250101_000006_create_event_annex_table;
mod m20250101_000007_create_user_role_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_event_table::Migration),
            Box::new(m20250101_000002_create_event_voting_option_table::Migration),
            Box::new(m20250101_000003_create_event_vote_table::Migration),
            Box::new(m20250101_000004_create_engagement_table::Migration),
            Box::new(m20250101_000005_create_event_moderation_table::Migration),
            Box::new(m20250101_000006_create_event_annex_table::Migration),
            Box::new(m20250101_000007_create_user_role_table::Migration),
        ]
    }
}
