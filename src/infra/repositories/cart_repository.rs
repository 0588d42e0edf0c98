//! Shopping cart repository.

use async_trait::async_trait;
use futures::stream::BoxStream;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::cart_item::{self, ActiveModel, Entity as CartItemEntity};
use super::entities::product::Entity as ProductEntity;
use crate::domain::{CartItem, CartLine, Product};
use crate::errors::AppResult;
use crate::infra::changes::{ChangeFeed, Table};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's cart line, if the product is in it
    async fn find(&self, user_id: i64, product_id: i64) -> AppResult<Option<CartItem>>;

    /// Cart lines joined with their products, ordered by product id
    async fn lines(&self, user_id: i64) -> AppResult<Vec<CartLine>>;

    /// Insert the line or overwrite its quantity
    async fn upsert(&self, item: CartItem) -> AppResult<()>;

    /// Remove one line; `false` if it was not in the cart
    async fn remove(&self, user_id: i64, product_id: i64) -> AppResult<bool>;

    /// Remove every line; returns how many were removed
    async fn clear(&self, user_id: i64) -> AppResult<u64>;

    /// Live cart lines for one user
    fn observe(&self, user_id: i64) -> BoxStream<'static, AppResult<Vec<CartLine>>>;
}

/// Concrete implementation of CartRepository
pub struct CartStore {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl CartStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }
}

pub(crate) async fn lines<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<Vec<CartLine>> {
    let rows = CartItemEntity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .order_by_asc(cart_item::Column::ProductId)
        .find_also_related(ProductEntity)
        .all(conn)
        .await?;

    // Lines whose product vanished are dropped by the cascade; skip any stragglers
    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|product| CartLine {
                product: Product::from(product),
                quantity: item.quantity,
            })
        })
        .collect())
}

pub(crate) async fn clear<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<u64> {
    let result = CartItemEntity::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

#[async_trait]
impl CartRepository for CartStore {
    async fn find(&self, user_id: i64, product_id: i64) -> AppResult<Option<CartItem>> {
        let result = CartItemEntity::find_by_id((user_id, product_id))
            .one(&self.db)
            .await?;

        Ok(result.map(CartItem::from))
    }

    async fn lines(&self, user_id: i64) -> AppResult<Vec<CartLine>> {
        lines(&self.db, user_id).await
    }

    async fn upsert(&self, item: CartItem) -> AppResult<()> {
        let active_model = ActiveModel {
            user_id: Set(item.user_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
        };

        CartItemEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([cart_item::Column::UserId, cart_item::Column::ProductId])
                    .update_column(cart_item::Column::Quantity)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.changes.notify(Table::CartItems);
        Ok(())
    }

    async fn remove(&self, user_id: i64, product_id: i64) -> AppResult<bool> {
        let result = CartItemEntity::delete_by_id((user_id, product_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            self.changes.notify(Table::CartItems);
        }
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, user_id: i64) -> AppResult<u64> {
        let removed = clear(&self.db, user_id).await?;
        if removed > 0 {
            self.changes.notify(Table::CartItems);
        }
        Ok(removed)
    }

    fn observe(&self, user_id: i64) -> BoxStream<'static, AppResult<Vec<CartLine>>> {
        let db = self.db.clone();
        self.changes
            .watch(&[Table::CartItems, Table::Products], move || {
                let db = db.clone();
                async move { lines(&db, user_id).await }
            })
    }
}
