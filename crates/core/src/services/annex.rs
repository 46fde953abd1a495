//! Related items annexed to an event.

use std::collections::HashSet;

use chrono::Utc;
use plaza_common::{AppError, AppResult, IdGenerator};
use plaza_db::{
    entities::{event_annex, event_annex::AnnexKind},
    repositories::{EventAnnexRepository, EventRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::authorization::Actor;

/// Most items one event may annex.
pub const MAX_ANNEXES: usize = 20;

/// A content, event or thread picked from a selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectableItem {
    pub kind: AnnexKind,
    pub id: String,
}

impl From<&event_annex::Model> for SelectableItem {
    fn from(annex: &event_annex::Model) -> Self {
        Self {
            kind: annex.kind,
            id: annex.annexed_id.clone(),
        }
    }
}

/// Annex service for business logic.
#[derive(Clone)]
pub struct AnnexService {
    annex_repo: EventAnnexRepository,
    event_repo: EventRepository,
    id_gen: IdGenerator,
}

impl AnnexService {
    /// Create a new annex service.
    #[must_use]
    pub const fn new(annex_repo: EventAnnexRepository, event_repo: EventRepository) -> Self {
        Self {
            annex_repo,
            event_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Replace the annexes of an event, keeping the submitted order.
    pub async fn replace(
        &self,
        actor: &Actor,
        event_id: &str,
        items: &[SelectableItem],
    ) -> AppResult<Vec<SelectableItem>> {
        let event = self.event_repo.get_by_id(event_id).await?;
        actor.ensure_can_manage(&event.user_id)?;

        if items
            .iter()
            .any(|item| item.kind == AnnexKind::Event && item.id == event_id)
        {
            return Err(AppError::BadRequest(
                "An event cannot be annexed to itself".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let unique: Vec<&SelectableItem> = items.iter().filter(|item| seen.insert(*item)).collect();
        if unique.len() > MAX_ANNEXES {
            return Err(AppError::BadRequest(format!(
                "At most {MAX_ANNEXES} items can be annexed"
            )));
        }

        let ids = self.id_gen.generate_ordered(unique.len())?;
        let models = ids
            .into_iter()
            .zip(&unique)
            .map(|(id, item)| event_annex::ActiveModel {
                id: Set(id),
                event_id: Set(event_id.to_string()),
                kind: Set(item.kind),
                annexed_id: Set(item.id.clone()),
                user_id: Set(actor.id.clone()),
                created_at: Set(Utc::now().into()),
            })
            .collect();

        self.annex_repo.replace(event_id, models).await?;

        info!(event_id = %event_id, count = unique.len(), "Annexes replaced");
        Ok(unique.into_iter().cloned().collect())
    }

    /// Annexed items in the order they were submitted.
    pub async fn list(&self, event_id: &str) -> AppResult<Vec<SelectableItem>> {
        let annexes = self.annex_repo.find_by_event(event_id).await?;
        Ok(annexes.iter().map(SelectableItem::from).collect())
    }
}
