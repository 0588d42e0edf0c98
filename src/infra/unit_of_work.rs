//! Unit of Work pattern implementation.
//!
//! Centralizes access to the repositories and owns the transaction
//! boundary used by order placement: every stock check, stock decrement
//! and row insert of one checkout commits together or not at all.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::changes::ChangeFeed;
use super::repositories::{
    cart_repository, order_repository, product_repository, CartRepository, CartStore,
    FavoriteRepository, FavoriteStore, OrderRepository, OrderStore, ProductRepository,
    ProductStore, UserRepository, UserStore,
};
use crate::domain::{CartLine, NewOrder, Order, OrderLine, Product};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Tests build one from mocked repositories instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn carts(&self) -> Arc<dyn CartRepository>;

    fn favorites(&self) -> Arc<dyn FavoriteRepository>;

    /// Feed that writes inside a transaction are published to after commit
    fn changes(&self) -> &ChangeFeed;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn products(&self) -> TxProductRepository<'_> {
        TxProductRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository { txn: self.txn }
    }

    pub fn carts(&self) -> TxCartRepository<'_> {
        TxCartRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    changes: ChangeFeed,
    user_repo: Arc<UserStore>,
    product_repo: Arc<ProductStore>,
    order_repo: Arc<OrderStore>,
    cart_repo: Arc<CartStore>,
    favorite_repo: Arc<FavoriteStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let changes = ChangeFeed::new();
        Self {
            user_repo: Arc::new(UserStore::new(db.clone(), changes.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone(), changes.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone(), changes.clone())),
            cart_repo: Arc::new(CartStore::new(db.clone(), changes.clone())),
            favorite_repo: Arc::new(FavoriteStore::new(db.clone(), changes.clone())),
            changes,
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteRepository> {
        self.favorite_repo.clone()
    }

    fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        // SQLite transactions are serializable already
        let txn = self.db.begin().await.map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware product repository.
pub struct TxProductRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProductRepository<'a> {
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        product_repository::find_by_id(self.txn, id).await
    }

    /// Conditional decrement; `false` when the stock no longer covers `quantity`
    pub async fn decrement_stock(&self, id: i64, quantity: i32) -> AppResult<bool> {
        product_repository::decrement_stock(self.txn, id, quantity).await
    }
}

/// Transaction-aware order repository.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub async fn insert(&self, order: NewOrder) -> AppResult<Order> {
        order_repository::insert(self.txn, order).await
    }

    pub async fn insert_items(&self, order_id: i64, lines: &[OrderLine]) -> AppResult<()> {
        order_repository::insert_items(self.txn, order_id, lines).await
    }
}

/// Transaction-aware cart repository.
pub struct TxCartRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCartRepository<'a> {
    pub async fn lines(&self, user_id: i64) -> AppResult<Vec<CartLine>> {
        cart_repository::lines(self.txn, user_id).await
    }

    pub async fn clear(&self, user_id: i64) -> AppResult<u64> {
        cart_repository::clear(self.txn, user_id).await
    }
}

/// Unit of work over mocked repositories, for service tests.
///
/// Transactions are not supported and fail with an internal error.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestUnitOfWork {
    pub users: Arc<super::repositories::MockUserRepository>,
    pub products: Arc<super::repositories::MockProductRepository>,
    pub orders: Arc<super::repositories::MockOrderRepository>,
    pub carts: Arc<super::repositories::MockCartRepository>,
    pub favorites: Arc<super::repositories::MockFavoriteRepository>,
    pub changes: ChangeFeed,
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for TestUnitOfWork {
    fn default() -> Self {
        use super::repositories::*;
        Self {
            users: Arc::new(MockUserRepository::new()),
            products: Arc::new(MockProductRepository::new()),
            orders: Arc::new(MockOrderRepository::new()),
            carts: Arc::new(MockCartRepository::new()),
            favorites: Arc::new(MockFavoriteRepository::new()),
            changes: ChangeFeed::new(),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteRepository> {
        self.favorites.clone()
    }

    fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

/// Simpler API for executing transactional operations.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
