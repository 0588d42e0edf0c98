//! Order repository: order headers, their snapshot items and the
//! aggregate reads behind sales analytics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use super::entities::order::{self, ActiveModel, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use super::entities::product::Entity as ProductEntity;
use crate::domain::money::to_cents;
use crate::domain::{NewOrder, Order, OrderItem, OrderLine, OrderStatus};
use crate::errors::AppResult;
use crate::infra::changes::{ChangeFeed, Table};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Summed order-item quantity for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromQueryResult)]
pub struct ProductQuantity {
    pub product_id: i64,
    pub quantity_sold: i64,
}

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>>;

    /// The user's orders, newest first
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Order>>;

    /// Every order, newest first
    async fn list_all(&self) -> AppResult<Vec<Order>>;

    async fn list_by_status(&self, status: OrderStatus) -> AppResult<Vec<Order>>;

    /// Snapshot lines of one order with the product name when it still exists
    async fn lines(&self, order_id: i64) -> AppResult<Vec<OrderLine>>;

    /// Set the status in one keyed UPDATE; `false` if the order does not exist
    async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<bool>;

    /// The `limit` product ids with the highest summed quantity
    async fn top_product_quantities(&self, limit: u64) -> AppResult<Vec<ProductQuantity>>;

    /// Every order item recorded for one product
    async fn items_for_product(&self, product_id: i64) -> AppResult<Vec<OrderItem>>;

    /// Every order item belonging to a DELIVERED order
    async fn delivered_items(&self) -> AppResult<Vec<OrderItem>>;

    /// DELIVERED orders placed in `[from, until)`
    async fn delivered_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<Order>>;

    async fn count(&self) -> AppResult<u64>;

    fn observe_for_user(&self, user_id: i64) -> BoxStream<'static, AppResult<Vec<Order>>>;

    fn observe_all(&self) -> BoxStream<'static, AppResult<Vec<Order>>>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl OrderStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, order: NewOrder) -> AppResult<Order> {
    let checkout = order.checkout;
    let active_model = ActiveModel {
        user_id: Set(order.user_id),
        order_date: Set(order.order_date),
        total_cents: Set(to_cents(order.total_amount)?),
        status: Set(order.status.as_str().to_string()),
        customer_name: Set(checkout.customer_name),
        customer_phone: Set(checkout.customer_phone),
        customer_email: Set(checkout.customer_email),
        customer_address: Set(checkout.customer_address),
        delivery_price_cents: Set(checkout.delivery_price.map(to_cents).transpose()?),
        payment_method: Set(checkout.payment_method),
        notes: Set(checkout.notes),
        ..Default::default()
    };

    let model = active_model.insert(conn).await?;
    Ok(Order::from(model))
}

pub(crate) async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
    lines: &[OrderLine],
) -> AppResult<()> {
    if lines.is_empty() {
        return Ok(());
    }

    let models = lines
        .iter()
        .map(|line| {
            Ok(order_item::ActiveModel {
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                price_per_item_cents: Set(to_cents(line.price_per_item)?),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    OrderItemEntity::insert_many(models)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<Vec<Order>> {
    let models = OrderEntity::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::OrderDate)
        .order_by_desc(order::Column::Id)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(Order::from).collect())
}

async fn list_all<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<Order>> {
    let models = OrderEntity::find()
        .order_by_desc(order::Column::OrderDate)
        .order_by_desc(order::Column::Id)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(Order::from).collect())
}

fn delivered() -> sea_orm::sea_query::SimpleExpr {
    order::Column::Status.eq(OrderStatus::Delivered.as_str())
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Order::from))
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Order>> {
        list_for_user(&self.db, user_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Order>> {
        list_all(&self.db).await
    }

    async fn list_by_status(&self, status: OrderStatus) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .filter(order::Column::Status.eq(status.as_str()))
            .order_by_desc(order::Column::OrderDate)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Order::from).collect())
    }

    async fn lines(&self, order_id: i64) -> AppResult<Vec<OrderLine>> {
        let rows = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::ProductId)
            .find_also_related(ProductEntity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| {
                let item = OrderItem::from(item);
                OrderLine {
                    product_id: item.product_id,
                    product_name: product.map(|p| p.name),
                    quantity: item.quantity,
                    price_per_item: item.price_per_item,
                }
            })
            .collect())
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<bool> {
        let result = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.as_str()))
            .filter(order::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            self.changes.notify(Table::Orders);
        }
        Ok(result.rows_affected > 0)
    }

    async fn top_product_quantities(&self, limit: u64) -> AppResult<Vec<ProductQuantity>> {
        let rows = OrderItemEntity::find()
            .select_only()
            .column(order_item::Column::ProductId)
            .column_as(order_item::Column::Quantity.sum(), "quantity_sold")
            .group_by(order_item::Column::ProductId)
            .order_by_desc(order_item::Column::Quantity.sum())
            .limit(limit)
            .into_model::<ProductQuantity>()
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    async fn items_for_product(&self, product_id: i64) -> AppResult<Vec<OrderItem>> {
        let models = OrderItemEntity::find()
            .filter(order_item::Column::ProductId.eq(product_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(OrderItem::from).collect())
    }

    async fn delivered_items(&self) -> AppResult<Vec<OrderItem>> {
        let models = OrderItemEntity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                order_item::Relation::Order.def(),
            )
            .filter(delivered())
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(OrderItem::from).collect())
    }

    async fn delivered_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<Order>> {
        let models = OrderEntity::find()
            .filter(delivered())
            .filter(order::Column::OrderDate.gte(from))
            .filter(order::Column::OrderDate.lt(until))
            .order_by_asc(order::Column::OrderDate)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Order::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(OrderEntity::find().count(&self.db).await?)
    }

    fn observe_for_user(&self, user_id: i64) -> BoxStream<'static, AppResult<Vec<Order>>> {
        let db = self.db.clone();
        self.changes.watch(&[Table::Orders], move || {
            let db = db.clone();
            async move { list_for_user(&db, user_id).await }
        })
    }

    fn observe_all(&self) -> BoxStream<'static, AppResult<Vec<Order>>> {
        let db = self.db.clone();
        self.changes.watch(&[Table::Orders], move || {
            let db = db.clone();
            async move { list_all(&db).await }
        })
    }
}
