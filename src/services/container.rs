//! Service Container - Centralized service access with parallel execution support.
//!
//! Wires every shop service onto one shared `Persistence` so they see the
//! same connection and change feed.

use std::future::Future;
use std::sync::Arc;

use super::{
    AnalyticsService, AuthService, CartService, ExportService, FavoriteService, OrderService,
    ProductService, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{FileSessionStore, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn favorites(&self) -> Arc<dyn FavoriteService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn analytics(&self) -> Arc<dyn AnalyticsService>;

    fn exports(&self) -> Arc<dyn ExportService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    product_service: Arc<dyn ProductService>,
    cart_service: Arc<dyn CartService>,
    favorite_service: Arc<dyn FavoriteService>,
    order_service: Arc<dyn OrderService>,
    analytics_service: Arc<dyn AnalyticsService>,
    export_service: Arc<dyn ExportService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        use super::{
            Authenticator, CartManager, FavoriteManager, OrderManager, ProductCatalog,
            SalesAnalytics, SpreadsheetExporter, UserManager,
        };

        let uow = Arc::new(Persistence::new(db));
        let session_store = Arc::new(FileSessionStore::new(config.session_path.clone()));

        let analytics_service: Arc<dyn AnalyticsService> = Arc::new(SalesAnalytics::new(
            uow.clone(),
            config.category_revenue_basis,
        ));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), session_store)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            product_service: Arc::new(ProductCatalog::new(
                uow.clone(),
                config.low_stock_threshold,
            )),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            favorite_service: Arc::new(FavoriteManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(uow.clone())),
            export_service: Arc::new(SpreadsheetExporter::new(
                uow,
                analytics_service.clone(),
                config.export_dir.clone(),
                config.top_sellers_limit,
            )),
            analytics_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteService> {
        self.favorite_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn analytics(&self) -> Arc<dyn AnalyticsService> {
        self.analytics_service.clone()
    }

    fn exports(&self) -> Arc<dyn ExportService> {
        self.export_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute a dynamic number of operations, preserving input order.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}
