//! Favorites repository.

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::favorite_item::{self, ActiveModel, Entity as FavoriteEntity};
use super::entities::product::Entity as ProductEntity;
use crate::domain::Product;
use crate::errors::AppResult;
use crate::infra::changes::{ChangeFeed, Table};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Favorites repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn exists(&self, user_id: i64, product_id: i64) -> AppResult<bool>;

    /// Bookmark a product; adding an existing favorite is a no-op
    async fn add(&self, user_id: i64, product_id: i64) -> AppResult<()>;

    /// `false` if the product was not a favorite
    async fn remove(&self, user_id: i64, product_id: i64) -> AppResult<bool>;

    /// Favorite products, most recently added first
    async fn products(&self, user_id: i64) -> AppResult<Vec<Product>>;

    fn observe(&self, user_id: i64) -> BoxStream<'static, AppResult<Vec<Product>>>;
}

/// Concrete implementation of FavoriteRepository
pub struct FavoriteStore {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl FavoriteStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }
}

async fn products<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<Vec<Product>> {
    let rows = FavoriteEntity::find()
        .filter(favorite_item::Column::UserId.eq(user_id))
        .order_by_desc(favorite_item::Column::DateAdded)
        .find_also_related(ProductEntity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(_, product)| product.map(Product::from))
        .collect())
}

#[async_trait]
impl FavoriteRepository for FavoriteStore {
    async fn exists(&self, user_id: i64, product_id: i64) -> AppResult<bool> {
        let count = FavoriteEntity::find()
            .filter(favorite_item::Column::UserId.eq(user_id))
            .filter(favorite_item::Column::ProductId.eq(product_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn add(&self, user_id: i64, product_id: i64) -> AppResult<()> {
        let active_model = ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            date_added: Set(Utc::now()),
        };

        FavoriteEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    favorite_item::Column::UserId,
                    favorite_item::Column::ProductId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.changes.notify(Table::FavoriteItems);
        Ok(())
    }

    async fn remove(&self, user_id: i64, product_id: i64) -> AppResult<bool> {
        let result = FavoriteEntity::delete_by_id((user_id, product_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            self.changes.notify(Table::FavoriteItems);
        }
        Ok(result.rows_affected > 0)
    }

    async fn products(&self, user_id: i64) -> AppResult<Vec<Product>> {
        products(&self.db, user_id).await
    }

    fn observe(&self, user_id: i64) -> BoxStream<'static, AppResult<Vec<Product>>> {
        let db = self.db.clone();
        self.changes
            .watch(&[Table::FavoriteItems, Table::Products], move || {
                let db = db.clone();
                async move { products(&db, user_id).await }
            })
    }
}
