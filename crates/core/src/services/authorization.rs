//! Acting user and permission checks.

use plaza_common::{AppError, AppResult};
use plaza_db::entities::user_role::Role;
use serde::Serialize;

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    /// Create an actor.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Moderators and admins.
    #[must_use]
    pub const fn is_moderator(&self) -> bool {
        matches!(self.role, Role::Moderator | Role::Admin)
    }

    /// Whether the actor may edit or delete something owned by `owner_id`.
    #[must_use]
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.id == owner_id || self.is_moderator()
    }

    /// Fail with `Forbidden` unless [`Actor::can_manage`] holds.
    pub fn ensure_can_manage(&self, owner_id: &str) -> AppResult<()> {
        if self.can_manage(owner_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the owner or a moderator can do this".to_string(),
            ))
        }
    }

    /// Fail with `Forbidden` unless the actor is an admin.
    pub fn ensure_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Fail with `Forbidden` unless the actor is a moderator or admin.
    pub fn ensure_moderator(&self) -> AppResult<()> {
        if self.is_moderator() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Moderator role required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_manage() {
        let actor = Actor::new("user1", Role::User);
        assert!(actor.can_manage("user1"));
        assert!(!actor.can_manage("user2"));
        assert!(actor.ensure_can_manage("user2").is_err());
    }

    #[test]
    fn test_moderator_and_admin_can_manage_anything() {
        assert!(Actor::new("mod1", Role::Moderator).can_manage("user2"));
        assert!(Actor::new("admin1", Role::Admin).can_manage("user2"));
    }

    #[test]
    fn test_ensure_moderator() {
        assert!(Actor::new("user1", Role::User).ensure_moderator().is_err());
        assert!(Actor::new("mod1", Role::Moderator).ensure_moderator().is_ok());
    }

    #[test]
    fn test_ensure_admin() {
        assert!(Actor::new("mod1", Role::Moderator).ensure_admin().is_err());
        assert!(Actor::new("admin1", Role::Admin).ensure_admin().is_ok());
    }
}
