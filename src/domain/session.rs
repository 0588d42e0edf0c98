//! Signed-in session, passed explicitly to operations that need identity.

use serde::{Deserialize, Serialize};

use super::user::{User, UserRole};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Fail with `Forbidden` unless the session belongs to a manager
    pub fn require_manager(&self) -> AppResult<()> {
        if self.role.can_access(&UserRole::Manager) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Whether this session may read data owned by `owner_id`
    pub fn can_view(&self, owner_id: i64) -> bool {
        self.is_manager() || self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> Session {
        Session {
            user_id: 7,
            username: "casey".to_string(),
            role,
        }
    }

    #[test]
    fn test_manager_guard() {
        assert!(session(UserRole::Manager).require_manager().is_ok());
        assert!(matches!(
            session(UserRole::Customer).require_manager(),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_ownership() {
        assert!(session(UserRole::Customer).can_view(7));
        assert!(!session(UserRole::Customer).can_view(8));
        assert!(session(UserRole::Manager).can_view(8));
    }
}
