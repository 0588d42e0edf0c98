//! Product catalog service.
//!
//! Browsing is open to every signed-in user; catalog edits are limited to
//! managers.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;
use validator::Validate;

use crate::domain::{Category, NewProduct, Product, ProductFilter, ProductUpdate, Session};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Catalog service trait for dependency injection.
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn list_page(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>>;

    async fn products_by_category(&self, category: Category) -> AppResult<Vec<Product>>;

    /// Products with stock left
    async fn available_products(&self) -> AppResult<Vec<Product>>;

    /// Case-insensitive name search
    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> AppResult<Product>;

    /// Products at or below the configured low-stock threshold (managers)
    async fn low_stock(&self, session: &Session) -> AppResult<Vec<Product>>;

    async fn create_product(&self, session: &Session, product: NewProduct) -> AppResult<Product>;

    async fn update_product(
        &self,
        session: &Session,
        id: i64,
        update: ProductUpdate,
    ) -> AppResult<Product>;

    async fn set_stock(&self, session: &Session, id: i64, quantity: i32) -> AppResult<Product>;

    async fn delete_product(&self, session: &Session, id: i64) -> AppResult<()>;

    /// Live catalog stream
    fn observe_products(&self) -> BoxStream<'static, AppResult<Vec<Product>>>;
}

/// Concrete implementation of ProductService using Unit of Work.
pub struct ProductCatalog<U: UnitOfWork> {
    uow: Arc<U>,
    low_stock_threshold: i32,
}

impl<U: UnitOfWork> ProductCatalog<U> {
    pub fn new(uow: Arc<U>, low_stock_threshold: i32) -> Self {
        Self {
            uow,
            low_stock_threshold,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProductService for ProductCatalog<U> {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list(ProductFilter::default()).await
    }

    async fn list_page(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>> {
        self.uow.products().list_page(filter, params).await
    }

    async fn products_by_category(&self, category: Category) -> AppResult<Vec<Product>> {
        self.uow.products().list(ProductFilter::category(category)).await
    }

    async fn available_products(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list(ProductFilter::available()).await
    }

    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>> {
        self.uow.products().list(ProductFilter::search(query)).await
    }

    async fn get_product(&self, id: i64) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    async fn low_stock(&self, session: &Session) -> AppResult<Vec<Product>> {
        session.require_manager()?;
        self.uow.products().low_stock(self.low_stock_threshold).await
    }

    async fn create_product(&self, session: &Session, product: NewProduct) -> AppResult<Product> {
        session.require_manager()?;
        product.validate()?;

        let created = self.uow.products().create(product).await?;
        tracing::info!(product_id = created.id, category = %created.category.as_str(), "Product created");
        Ok(created)
    }

    async fn update_product(
        &self,
        session: &Session,
        id: i64,
        update: ProductUpdate,
    ) -> AppResult<Product> {
        session.require_manager()?;
        update.validate()?;

        let updated = self.uow.products().update(id, update).await?;
        tracing::info!(product_id = id, "Product updated");
        Ok(updated)
    }

    async fn set_stock(&self, session: &Session, id: i64, quantity: i32) -> AppResult<Product> {
        session.require_manager()?;
        if quantity < 0 {
            return Err(AppError::validation("Quantity cannot be negative"));
        }

        let updated = self.uow.products().set_stock(id, quantity).await?;
        tracing::info!(product_id = id, quantity, "Stock set");
        Ok(updated)
    }

    async fn delete_product(&self, session: &Session, id: i64) -> AppResult<()> {
        session.require_manager()?;
        self.uow.products().delete(id).await?;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    fn observe_products(&self) -> BoxStream<'static, AppResult<Vec<Product>>> {
        self.uow.products().observe_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::MockProductRepository;
    use crate::infra::TestUnitOfWork;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn session(role: UserRole) -> Session {
        Session {
            user_id: 1,
            username: "sam".to_string(),
            role,
        }
    }

    fn new_product(price: i64) -> NewProduct {
        NewProduct {
            name: "Desk lamp".to_string(),
            description: "Warm light".to_string(),
            price: Decimal::new(price, 2),
            category: Category::Home,
            image_url: "lamp.png".to_string(),
            quantity: 3,
            size: None,
            color: Some("Brass".to_string()),
        }
    }

    fn service(products: MockProductRepository) -> ProductCatalog<TestUnitOfWork> {
        let uow = TestUnitOfWork {
            products: Arc::new(products),
            ..Default::default()
        };
        ProductCatalog::new(Arc::new(uow), 5)
    }

    #[tokio::test]
    async fn test_customer_cannot_create() {
        let mut products = MockProductRepository::new();
        products.expect_create().never();

        let result = service(products)
            .create_product(&session(UserRole::Customer), new_product(1999))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_create_rejects_zero_price() {
        let mut products = MockProductRepository::new();
        products.expect_create().never();

        let result = service(products)
            .create_product(&session(UserRole::Manager), new_product(0))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let mut products = MockProductRepository::new();
        products.expect_find_by_id().with(eq(42)).returning(|_| Ok(None));

        let result = service(products).get_product(42).await;
        assert!(matches!(result, Err(AppError::ProductNotFound(42))));
    }

    #[tokio::test]
    async fn test_low_stock_uses_threshold() {
        let mut products = MockProductRepository::new();
        products
            .expect_low_stock()
            .with(eq(5))
            .times(1)
            .returning(|_| Ok(vec![]));

        let result = service(products)
            .low_stock(&session(UserRole::Manager))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() {
        let mut products = MockProductRepository::new();
        products.expect_set_stock().never();

        let result = service(products)
            .set_stock(&session(UserRole::Manager), 1, -1)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_builds_filter() {
        let mut products = MockProductRepository::new();
        products
            .expect_list()
            .withf(|filter| filter.search.as_deref() == Some("lamp") && !filter.available_only)
            .returning(|_| Ok(vec![]));

        service(products).search_products("lamp").await.unwrap();
    }
}
