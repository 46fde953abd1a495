//! Event annex repository.

use std::sync::Arc;

use crate::entities::{EventAnnex, event_annex};
use plaza_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

/// Annex repository for database operations.
#[derive(Clone)]
pub struct EventAnnexRepository {
    db: Arc<DatabaseConnection>,
}

impl EventAnnexRepository {
    /// Create a new annex repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Annexes of an event in the order they were attached.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<event_annex::Model>> {
        EventAnnex::find()
            .filter(event_annex::Column::EventId.eq(event_id))
            .order_by_asc(event_annex::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace all annexes of an event in one transaction.
    pub async fn replace(
        &self,
        event_id: &str,
        annexes: Vec<event_annex::ActiveModel>,
    ) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        EventAnnex::delete_many()
            .filter(event_annex::Column::EventId.eq(event_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !annexes.is_empty() {
            EventAnnex::insert_many(annexes)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
