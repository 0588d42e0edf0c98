//! User repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{ProfileUpdate, RegisterUser, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::changes::{ChangeFeed, Table};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find user by username (exact match)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a new user; the plaintext password in `registration` is ignored
    async fn create(&self, registration: RegisterUser, password_hash: String) -> AppResult<User>;

    /// Apply a profile edit
    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> AppResult<User>;

    /// Replace the stored password hash
    async fn update_password(&self, id: i64, password_hash: String) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, registration: RegisterUser, password_hash: String) -> AppResult<User> {
        let active_model = ActiveModel {
            username: Set(registration.username),
            password_hash: Set(password_hash),
            email: Set(registration.email),
            full_name: Set(registration.full_name),
            phone: Set(registration.phone),
            address: Set(registration.address),
            role: Set(registration.role.as_str().to_string()),
            ..Default::default()
        };

        // The unique index settles registrations that raced past the lookup
        let model = active_model.insert(&self.db).await.map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                AppError::conflict("Username")
            } else {
                err
            }
        })?;

        self.changes.notify(Table::Users);
        Ok(User::from(model))
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = user.into();

        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(full_name) = update.full_name {
            active.full_name = Set(Some(full_name));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = update.address {
            active.address = Set(Some(address));
        }

        let model = active.update(&self.db).await?;
        self.changes.notify(Table::Users);
        Ok(User::from(model))
    }

    async fn update_password(&self, id: i64, password_hash: String) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User"));
        }

        self.changes.notify(Table::Users);
        Ok(())
    }
}
