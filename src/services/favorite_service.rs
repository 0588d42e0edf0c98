//! Favorites service.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::domain::{Product, Session};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Favorites service trait for dependency injection.
#[async_trait]
pub trait FavoriteService: Send + Sync {
    /// Flip membership; returns `true` when the product is now a favorite
    async fn toggle_favorite(&self, session: &Session, product_id: i64) -> AppResult<bool>;

    async fn is_favorite(&self, session: &Session, product_id: i64) -> AppResult<bool>;

    async fn favorites(&self, session: &Session) -> AppResult<Vec<Product>>;

    fn observe_favorites(&self, session: &Session) -> BoxStream<'static, AppResult<Vec<Product>>>;
}

/// Concrete implementation of FavoriteService using Unit of Work.
pub struct FavoriteManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> FavoriteManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> FavoriteService for FavoriteManager<U> {
    async fn toggle_favorite(&self, session: &Session, product_id: i64) -> AppResult<bool> {
        let favorites = self.uow.favorites();

        if favorites.exists(session.user_id, product_id).await? {
            favorites.remove(session.user_id, product_id).await?;
            return Ok(false);
        }

        if self.uow.products().find_by_id(product_id).await?.is_none() {
            return Err(AppError::ProductNotFound(product_id));
        }
        favorites.add(session.user_id, product_id).await?;
        Ok(true)
    }

    async fn is_favorite(&self, session: &Session, product_id: i64) -> AppResult<bool> {
        self.uow.favorites().exists(session.user_id, product_id).await
    }

    async fn favorites(&self, session: &Session) -> AppResult<Vec<Product>> {
        self.uow.favorites().products(session.user_id).await
    }

    fn observe_favorites(&self, session: &Session) -> BoxStream<'static, AppResult<Vec<Product>>> {
        self.uow.favorites().observe(session.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::{MockFavoriteRepository, MockProductRepository};
    use crate::infra::TestUnitOfWork;

    fn session() -> Session {
        Session {
            user_id: 8,
            username: "kai".to_string(),
            role: UserRole::Customer,
        }
    }

    #[tokio::test]
    async fn test_toggle_removes_existing() {
        let mut favorites = MockFavoriteRepository::new();
        favorites.expect_exists().returning(|_, _| Ok(true));
        favorites.expect_remove().times(1).returning(|_, _| Ok(true));
        favorites.expect_add().never();

        let service = FavoriteManager::new(Arc::new(TestUnitOfWork {
            favorites: Arc::new(favorites),
            ..Default::default()
        }));

        assert!(!service.toggle_favorite(&session(), 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_unknown_product() {
        let mut favorites = MockFavoriteRepository::new();
        favorites.expect_exists().returning(|_, _| Ok(false));
        favorites.expect_add().never();

        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(|_| Ok(None));

        let service = FavoriteManager::new(Arc::new(TestUnitOfWork {
            favorites: Arc::new(favorites),
            products: Arc::new(products),
            ..Default::default()
        }));

        let result = service.toggle_favorite(&session(), 3).await;
        assert!(matches!(result, Err(AppError::ProductNotFound(3))));
    }
}
