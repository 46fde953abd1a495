//! User role repository.

use std::sync::Arc;

use crate::entities::{UserRole, user_role, user_role::Role};
use plaza_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, EntityTrait};

/// User role repository for database operations.
#[derive(Clone)]
pub struct UserRoleRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRoleRepository {
    /// Create a new user role repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Role of a user; users without a row are plain users.
    pub async fn find_role(&self, user_id: &str) -> AppResult<Role> {
        let row: Option<user_role::Model> = UserRole::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| r.role).unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_role_moderator() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user_role::Model {
                    user_id: "mod1".to_string(),
                    role: Role::Moderator,
                }]])
                .into_connection(),
        );

        let repo = UserRoleRepository::new(db);
        assert_eq!(repo.find_role("mod1").await.unwrap(), Role::Moderator);
    }

    #[tokio::test]
    async fn test_find_role_defaults_to_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_role::Model>::new()])
                .into_connection(),
        );

        let repo = UserRoleRepository::new(db);
        assert_eq!(repo.find_role("someone").await.unwrap(), Role::User);
    }
}
