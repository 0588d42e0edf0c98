//! Order service - checkout and order tracking.
//!
//! Checkout runs in one transaction: read the cart, check and take stock
//! for every line, insert the order with its snapshot items, empty the
//! cart. Any failure rolls all of it back.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;
use validator::Validate;

use crate::domain::{
    CheckoutDetails, NewOrder, Order, OrderDetails, OrderLine, OrderStatus, Session,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Table, UnitOfWork};
use crate::with_transaction;

/// Tables a successful checkout writes to.
const CHECKOUT_TABLES: &[Table] = &[
    Table::Products,
    Table::Orders,
    Table::OrderItems,
    Table::CartItems,
];

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the signed-in user's cart into a pending order
    async fn place_order(&self, session: &Session, checkout: CheckoutDetails)
        -> AppResult<OrderDetails>;

    /// The signed-in user's orders, newest first
    async fn my_orders(&self, session: &Session) -> AppResult<Vec<Order>>;

    /// Every order (managers)
    async fn all_orders(&self, session: &Session) -> AppResult<Vec<Order>>;

    /// Orders in one status (managers)
    async fn orders_by_status(&self, session: &Session, status: OrderStatus)
        -> AppResult<Vec<Order>>;

    /// Order with its lines; customers only see their own
    async fn order_details(&self, session: &Session, order_id: i64) -> AppResult<OrderDetails>;

    /// Move an order to any status (managers)
    async fn update_status(
        &self,
        session: &Session,
        order_id: i64,
        status: OrderStatus,
    ) -> AppResult<()>;

    fn observe_my_orders(&self, session: &Session) -> BoxStream<'static, AppResult<Vec<Order>>>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn place_order(
        &self,
        session: &Session,
        checkout: CheckoutDetails,
    ) -> AppResult<OrderDetails> {
        checkout.validate()?;
        let user_id = session.user_id;

        let details = with_transaction!(self.uow, |ctx| {
            let cart = ctx.carts().lines(user_id).await?;
            if cart.is_empty() {
                return Err(AppError::validation("Cart is empty"));
            }

            let mut lines = Vec::with_capacity(cart.len());
            for entry in &cart {
                let product_id = entry.product.id;
                let product = ctx
                    .products()
                    .find_by_id(product_id)
                    .await?
                    .ok_or(AppError::ProductNotFound(product_id))?;

                if !product.has_stock_for(entry.quantity) {
                    return Err(AppError::InsufficientStock {
                        product: product.name,
                        available: product.quantity,
                        requested: entry.quantity,
                    });
                }

                lines.push(OrderLine::snapshot(&product, entry.quantity));

                // The decrement is the first write, so a checkout that lost
                // the write lock to another one fails here
                let taken = ctx
                    .products()
                    .decrement_stock(product_id, entry.quantity)
                    .await
                    .map_err(|e| {
                        if e.is_lock_contention() {
                            tracing::warn!(product_id, "Stock locked by a concurrent checkout");
                            AppError::StockUpdateFailed(product_id)
                        } else {
                            e
                        }
                    })?;
                if !taken {
                    return Err(AppError::StockUpdateFailed(product_id));
                }
            }

            let order = ctx
                .orders()
                .insert(NewOrder::pending(user_id, checkout, &lines))
                .await?;
            ctx.orders().insert_items(order.id, &lines).await?;
            ctx.carts().clear(user_id).await?;

            Ok(OrderDetails { order, lines })
        })?;

        self.uow.changes().notify_all(CHECKOUT_TABLES);
        tracing::info!(
            order_id = details.order.id,
            user_id,
            items = details.lines.len(),
            total = %details.order.total_amount,
            "Order placed"
        );
        Ok(details)
    }

    async fn my_orders(&self, session: &Session) -> AppResult<Vec<Order>> {
        self.uow.orders().list_for_user(session.user_id).await
    }

    async fn all_orders(&self, session: &Session) -> AppResult<Vec<Order>> {
        session.require_manager()?;
        self.uow.orders().list_all().await
    }

    async fn orders_by_status(
        &self,
        session: &Session,
        status: OrderStatus,
    ) -> AppResult<Vec<Order>> {
        session.require_manager()?;
        self.uow.orders().list_by_status(status).await
    }

    async fn order_details(&self, session: &Session, order_id: i64) -> AppResult<OrderDetails> {
        let order = self
            .uow
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_not_found("Order")?;

        if !session.can_view(order.user_id) {
            return Err(AppError::Forbidden);
        }

        let lines = self.uow.orders().lines(order_id).await?;
        Ok(OrderDetails { order, lines })
    }

    async fn update_status(
        &self,
        session: &Session,
        order_id: i64,
        status: OrderStatus,
    ) -> AppResult<()> {
        session.require_manager()?;

        if !self.uow.orders().update_status(order_id, status).await? {
            return Err(AppError::NotFound("Order"));
        }

        tracing::info!(order_id, status = status.as_str(), "Order status changed");
        Ok(())
    }

    fn observe_my_orders(&self, session: &Session) -> BoxStream<'static, AppResult<Vec<Order>>> {
        self.uow.orders().observe_for_user(session.user_id)
    }
}
