//! Authentication service - registration, sign in and the current session.
//!
//! At most one session is signed in at a time. It is held in memory and
//! mirrored to the session store so it survives restarts; the password
//! never leaves the user table.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::domain::{Password, RegisterUser, Session, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{SessionStore, StoredSession, UnitOfWork};

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account; usernames are unique
    async fn register(&self, registration: RegisterUser) -> AppResult<User>;

    /// Check credentials and make the user the current session
    async fn login(&self, username: &str, password: &str) -> AppResult<Session>;

    /// Forget the current session, in memory and on disk
    async fn logout(&self) -> AppResult<()>;

    /// Reload the session persisted by an earlier run, if still valid
    async fn restore(&self) -> AppResult<Option<Session>>;

    /// The signed-in session, if any
    async fn current(&self) -> Option<Session>;

    /// The signed-in session, or `Unauthorized`
    async fn require_session(&self) -> AppResult<Session> {
        self.current().await.ok_or(AppError::Unauthorized)
    }
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            uow,
            store,
            current: RwLock::new(None),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, mut registration: RegisterUser) -> AppResult<User> {
        registration.username = registration.username.trim().to_string();
        registration.validate()?;

        if self
            .uow
            .users()
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = self.uow.users().create(registration, password_hash).await?;

        tracing::info!(user_id = user.id, role = %user.role, "Registered user {}", user.username);
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> AppResult<Session> {
        let user = self.uow.users().find_by_username(username.trim()).await?;

        // Verify even for unknown usernames so both failures cost the same
        let valid = Password::verify_stored(user.as_ref().map(|u| u.password_hash.as_str()), password);

        let user = match user {
            Some(user) if valid => user,
            _ => {
                tracing::debug!("Rejected sign in for {}", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        let session = Session::for_user(&user);
        self.store.save(&StoredSession::from(&session)).await?;
        *self.current.write().await = Some(session.clone());

        tracing::info!(user_id = session.user_id, role = %session.role, "Signed in");
        Ok(session)
    }

    async fn logout(&self) -> AppResult<()> {
        let previous = self.current.write().await.take();
        self.store.clear().await?;

        if let Some(session) = previous {
            tracing::info!(user_id = session.user_id, "Signed out");
        }
        Ok(())
    }

    async fn restore(&self) -> AppResult<Option<Session>> {
        let Some(stored) = self.store.load().await? else {
            return Ok(None);
        };
        let Some(session) = stored.into_session() else {
            return Ok(None);
        };

        // The account may have been removed or changed role since
        let session = match self.uow.users().find_by_id(session.user_id).await? {
            Some(user) => Session::for_user(&user),
            None => {
                tracing::warn!(
                    user_id = session.user_id,
                    "Stored session refers to a missing user, clearing it"
                );
                self.store.clear().await?;
                return Ok(None);
            }
        };

        *self.current.write().await = Some(session.clone());
        tracing::debug!(user_id = session.user_id, "Session restored");
        Ok(Some(session))
    }

    async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::MockUserRepository;
    use crate::infra::{MockSessionStore, TestUnitOfWork};
    use mockall::predicate::eq;

    fn user(id: i64, password: &str) -> User {
        User {
            id,
            username: "riley".to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            email: "riley@example.com".to_string(),
            full_name: None,
            phone: None,
            address: None,
            role: UserRole::Manager,
        }
    }

    fn registration(username: &str) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            password: "correct horse".to_string(),
            email: "riley@example.com".to_string(),
            full_name: None,
            phone: None,
            address: None,
            role: UserRole::Customer,
        }
    }

    fn service(users: MockUserRepository, store: MockSessionStore) -> Authenticator<TestUnitOfWork> {
        let uow = TestUnitOfWork {
            users: Arc::new(users),
            ..Default::default()
        };
        Authenticator::new(Arc::new(uow), Arc::new(store))
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "riley")
            .returning(|_| Ok(Some(user(1, "correct horse"))));
        users.expect_create().never();

        let auth = service(users, MockSessionStore::new());
        let result = auth.register(registration(" riley ")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|_, hash| hash.starts_with("$argon2") && !hash.contains("correct horse"))
            .returning(|reg, hash| {
                Ok(User {
                    id: 3,
                    username: reg.username,
                    password_hash: hash,
                    email: reg.email,
                    full_name: None,
                    phone: None,
                    address: None,
                    role: reg.role,
                })
            });

        let auth = service(users, MockSessionStore::new());
        let created = auth.register(registration("riley")).await.unwrap();

        assert_eq!(created.id, 3);
        assert_eq!(created.role, UserRole::Customer);
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(9, "correct horse"))));

        let mut store = MockSessionStore::new();
        store
            .expect_save()
            .withf(|s| s.user_id == 9 && s.role == "MANAGER" && s.is_logged_in)
            .times(1)
            .returning(|_| Ok(()));

        let auth = service(users, store);
        let session = auth.login("riley", "correct horse").await.unwrap();

        assert!(session.is_manager());
        assert_eq!(auth.current().await, Some(session));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(9, "correct horse"))));
        let mut store = MockSessionStore::new();
        store.expect_save().never();

        let auth = service(users, store);
        let result = auth.login("riley", "battery staple").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert!(auth.current().await.is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));

        let auth = service(users, MockSessionStore::new());
        let result = auth.login("nobody", "whatever123").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_restore_drops_session_of_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().with(eq(4)).returning(|_| Ok(None));

        let mut store = MockSessionStore::new();
        store.expect_load().returning(|| {
            Ok(Some(StoredSession {
                user_id: 4,
                username: "gone".to_string(),
                role: "CUSTOMER".to_string(),
                is_logged_in: true,
            }))
        });
        store.expect_clear().times(1).returning(|| Ok(()));

        let auth = service(users, store);
        assert_eq!(auth.restore().await.unwrap(), None);
        assert!(matches!(auth.require_session().await, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_logout_clears_store() {
        let mut store = MockSessionStore::new();
        store.expect_clear().times(1).returning(|| Ok(()));

        let auth = service(MockUserRepository::new(), store);
        auth.logout().await.unwrap();
        assert!(auth.current().await.is_none());
    }
}
