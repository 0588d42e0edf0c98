//! Shopping cart service.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

use crate::domain::{CartItem, CartSummary, Product, Session};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Cart service trait for dependency injection.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Add units of a product, merging with any quantity already in the cart
    async fn add_to_cart(&self, session: &Session, product_id: i64, quantity: i32)
        -> AppResult<CartItem>;

    /// Overwrite the quantity of a line; zero removes it
    async fn set_quantity(
        &self,
        session: &Session,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<Option<CartItem>>;

    async fn remove_from_cart(&self, session: &Session, product_id: i64) -> AppResult<()>;

    async fn clear_cart(&self, session: &Session) -> AppResult<()>;

    /// Lines with product details and totals
    async fn cart(&self, session: &Session) -> AppResult<CartSummary>;

    fn observe_cart(&self, session: &Session) -> BoxStream<'static, AppResult<CartSummary>>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn product(&self, product_id: i64) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))
    }
}

fn ensure_stock(product: &Product, requested: i32) -> AppResult<()> {
    if product.has_stock_for(requested) {
        Ok(())
    } else {
        Err(AppError::InsufficientStock {
            product: product.name.clone(),
            available: product.quantity,
            requested,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn add_to_cart(
        &self,
        session: &Session,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<CartItem> {
        if quantity <= 0 {
            return Err(AppError::validation("Quantity must be greater than zero"));
        }

        let product = self.product(product_id).await?;
        let existing = self
            .uow
            .carts()
            .find(session.user_id, product_id)
            .await?
            .map_or(0, |item| item.quantity);

        let merged = existing
            .checked_add(quantity)
            .ok_or_else(|| AppError::validation("Quantity is too large"))?;
        ensure_stock(&product, merged)?;

        let item = CartItem {
            user_id: session.user_id,
            product_id,
            quantity: merged,
        };
        self.uow.carts().upsert(item).await?;

        tracing::debug!(user_id = session.user_id, product_id, quantity = merged, "Cart line updated");
        Ok(item)
    }

    async fn set_quantity(
        &self,
        session: &Session,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<Option<CartItem>> {
        if quantity < 0 {
            return Err(AppError::validation("Quantity cannot be negative"));
        }
        if quantity == 0 {
            self.uow.carts().remove(session.user_id, product_id).await?;
            return Ok(None);
        }

        let product = self.product(product_id).await?;
        ensure_stock(&product, quantity)?;

        let item = CartItem {
            user_id: session.user_id,
            product_id,
            quantity,
        };
        self.uow.carts().upsert(item).await?;
        Ok(Some(item))
    }

    async fn remove_from_cart(&self, session: &Session, product_id: i64) -> AppResult<()> {
        if self.uow.carts().remove(session.user_id, product_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Cart item"))
        }
    }

    async fn clear_cart(&self, session: &Session) -> AppResult<()> {
        let removed = self.uow.carts().clear(session.user_id).await?;
        tracing::debug!(user_id = session.user_id, removed, "Cart cleared");
        Ok(())
    }

    async fn cart(&self, session: &Session) -> AppResult<CartSummary> {
        let lines = self.uow.carts().lines(session.user_id).await?;
        Ok(CartSummary::new(lines))
    }

    fn observe_cart(&self, session: &Session) -> BoxStream<'static, AppResult<CartSummary>> {
        self.uow
            .carts()
            .observe(session.user_id)
            .map(|lines| lines.map(CartSummary::new))
            .boxed()
    }
}
