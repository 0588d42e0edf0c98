//! Product catalog repository.
//!
//! The free query functions take any `ConnectionTrait` so the same SQL runs
//! against the pool and inside an order placement transaction.

use async_trait::async_trait;
use futures::stream::BoxStream;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::domain::money::to_cents;
use crate::domain::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::errors::{AppError, AppResult};
use crate::infra::changes::{ChangeFeed, Table};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products matching `filter`, ordered by id
    async fn list(&self, filter: ProductFilter) -> AppResult<Vec<Product>>;

    /// One page of products matching `filter`
    async fn list_page(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>>;

    /// Products whose id is in `ids`; missing ids are skipped
    async fn find_many(&self, ids: Vec<i64>) -> AppResult<Vec<Product>>;

    /// Products with `quantity <= threshold`, lowest stock first
    async fn low_stock(&self, threshold: i32) -> AppResult<Vec<Product>>;

    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    async fn update(&self, id: i64, update: ProductUpdate) -> AppResult<Product>;

    /// Overwrite the stock count
    async fn set_stock(&self, id: i64, quantity: i32) -> AppResult<Product>;

    /// Delete a product; cart, favorite and order lines cascade
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Live catalog: emits the full list now and after every change
    fn observe_all(&self) -> BoxStream<'static, AppResult<Vec<Product>>>;
}

/// Concrete implementation of ProductRepository
pub struct ProductStore {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl ProductStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }
}

fn filtered(filter: &ProductFilter) -> Select<ProductEntity> {
    let mut query = ProductEntity::find();

    if let Some(category) = filter.category {
        query = query.filter(product::Column::Category.eq(category.as_str()));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(product::Column::Name.contains(search));
    }
    if filter.available_only {
        query = query.filter(product::Column::Quantity.gt(0));
    }

    query.order_by_asc(product::Column::Id)
}

pub(crate) async fn list<C: ConnectionTrait>(
    conn: &C,
    filter: &ProductFilter,
) -> AppResult<Vec<Product>> {
    let models = filtered(filter).all(conn).await?;
    Ok(models.into_iter().map(Product::from).collect())
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> AppResult<Option<Product>> {
    let result = ProductEntity::find_by_id(id).one(conn).await?;
    Ok(result.map(Product::from))
}

pub(crate) async fn find_many<C: ConnectionTrait>(conn: &C, ids: &[i64]) -> AppResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let models = ProductEntity::find()
        .filter(product::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(product::Column::Id)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(Product::from).collect())
}

/// Take `quantity` units from stock in a single guarded UPDATE.
///
/// Returns `false` when the row is missing or holds fewer than `quantity`
/// units at the moment of the write.
pub(crate) async fn decrement_stock<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    quantity: i32,
) -> AppResult<bool> {
    let result = ProductEntity::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).sub(quantity),
        )
        .filter(product::Column::Id.eq(id))
        .filter(product::Column::Quantity.gte(quantity))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        list(&self.db, &filter).await
    }

    async fn list_page(
        &self,
        filter: ProductFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Product>> {
        let paginator = filtered(&filter).paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()).await?;

        Ok(Paginated::new(
            models.into_iter().map(Product::from).collect(),
            params,
            total,
        ))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        find_by_id(&self.db, id).await
    }

    async fn find_many(&self, ids: Vec<i64>) -> AppResult<Vec<Product>> {
        find_many(&self.db, &ids).await
    }

    async fn low_stock(&self, threshold: i32) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Quantity.lte(threshold))
            .order_by_asc(product::Column::Quantity)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let active_model = ActiveModel {
            name: Set(product.name),
            description: Set(product.description),
            price_cents: Set(to_cents(product.price)?),
            category: Set(product.category.as_str().to_string()),
            image_url: Set(product.image_url),
            quantity: Set(product.quantity),
            size: Set(product.size),
            color: Set(product.color),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        self.changes.notify(Table::Products);
        Ok(Product::from(model))
    }

    async fn update(&self, id: i64, update: ProductUpdate) -> AppResult<Product> {
        let model = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::ProductNotFound(id))?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(price) = update.price {
            active.price_cents = Set(to_cents(price)?);
        }
        if let Some(category) = update.category {
            active.category = Set(category.as_str().to_string());
        }
        if let Some(image_url) = update.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(quantity) = update.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(size) = update.size {
            active.size = Set(Some(size));
        }
        if let Some(color) = update.color {
            active.color = Set(Some(color));
        }

        let model = active.update(&self.db).await?;
        self.changes.notify(Table::Products);
        Ok(Product::from(model))
    }

    async fn set_stock(&self, id: i64, quantity: i32) -> AppResult<Product> {
        let result = ProductEntity::update_many()
            .col_expr(product::Column::Quantity, Expr::value(quantity))
            .filter(product::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::ProductNotFound(id));
        }

        self.changes.notify(Table::Products);
        find_by_id(&self.db, id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::ProductNotFound(id));
        }

        self.changes.notify_all(&[
            Table::Products,
            Table::CartItems,
            Table::FavoriteItems,
            Table::OrderItems,
        ]);
        Ok(())
    }

    fn observe_all(&self) -> BoxStream<'static, AppResult<Vec<Product>>> {
        let db = self.db.clone();
        self.changes.watch(&[Table::Products], move || {
            let db = db.clone();
            async move { list(&db, &ProductFilter::default()).await }
        })
    }
}
