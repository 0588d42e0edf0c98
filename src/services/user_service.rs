//! User service - profile of the signed-in user.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use crate::domain::{Password, ProfileUpdate, Session, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// The signed-in user's account
    async fn profile(&self, session: &Session) -> AppResult<User>;

    /// Edit contact details of the signed-in user
    async fn update_profile(&self, session: &Session, update: ProfileUpdate) -> AppResult<User>;

    /// Replace the password after checking the current one
    async fn change_password(
        &self,
        session: &Session,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn profile(&self, session: &Session) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(session.user_id)
            .await?
            .ok_or_not_found("User")
    }

    async fn update_profile(&self, session: &Session, update: ProfileUpdate) -> AppResult<User> {
        update.validate()?;
        if update.is_empty() {
            return self.profile(session).await;
        }

        let user = self.uow.users().update_profile(session.user_id, update).await?;
        tracing::info!(user_id = user.id, "Profile updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        session: &Session,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.profile(session).await?;

        if !Password::from_hash(user.password_hash).verify(current_password) {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = Password::new(new_password)?.into_string();
        self.uow
            .users()
            .update_password(session.user_id, password_hash)
            .await?;

        tracing::info!(user_id = session.user_id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::MockUserRepository;
    use crate::infra::TestUnitOfWork;
    use mockall::predicate::eq;

    fn session() -> Session {
        Session {
            user_id: 5,
            username: "jordan".to_string(),
            role: UserRole::Customer,
        }
    }

    fn user(password: &str) -> User {
        User {
            id: 5,
            username: "jordan".to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            email: "jordan@example.com".to_string(),
            full_name: Some("Jordan Lee".to_string()),
            phone: None,
            address: None,
            role: UserRole::Customer,
        }
    }

    fn service(users: MockUserRepository) -> UserManager<TestUnitOfWork> {
        UserManager::new(Arc::new(TestUnitOfWork {
            users: Arc::new(users),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().with(eq(5)).returning(|_| Ok(None));

        let result = service(users).profile(&session()).await;
        assert!(matches!(result, Err(AppError::NotFound("User"))));
    }

    #[tokio::test]
    async fn test_update_profile_validates_email() {
        let mut users = MockUserRepository::new();
        users.expect_update_profile().never();

        let update = ProfileUpdate {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        let result = service(users).update_profile(&session(), update).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_update_returns_profile() {
        let mut users = MockUserRepository::new();
        users.expect_update_profile().never();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(user("hunter2hunter2"))));

        let result = service(users)
            .update_profile(&session(), ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(result.display_name(), "Jordan Lee");
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(user("hunter2hunter2"))));
        users.expect_update_password().never();

        let result = service(users)
            .change_password(&session(), "wrong-password", "new-password-1")
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_stores_new_hash() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(user("hunter2hunter2"))));
        users
            .expect_update_password()
            .withf(|id, hash| *id == 5 && Password::from_hash(hash.clone()).verify("new-password-1"))
            .times(1)
            .returning(|_, _| Ok(()));

        service(users)
            .change_password(&session(), "hunter2hunter2", "new-password-1")
            .await
            .unwrap();
    }
}
