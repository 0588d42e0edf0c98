//! Sales analytics.
//!
//! Every figure is recomputed from the order tables on each request.
//! Results come back as an `AnalyticsOutcome` so an empty shop and a
//! failed query look different to the caller.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use futures::stream::BoxStream;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::container::parallel;
use crate::config::MAX_DAILY_SALES_DAYS;
use crate::domain::{
    AnalyticsOutcome, CategorySales, DailySales, OrderItem, OrderStatus, ProductSales,
    RevenueBasis, SalesSummary,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{Table, UnitOfWork};

/// Tables the sales figures are derived from.
const SALES_TABLES: &[Table] = &[Table::Orders, Table::OrderItems, Table::Products];

/// Analytics service trait for dependency injection.
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// The `limit` best sellers by units sold, with snapshot revenue
    async fn top_selling(&self, limit: u64) -> AnalyticsOutcome<Vec<ProductSales>>;

    /// Revenue of DELIVERED orders per category; every category is present
    async fn sales_by_category(&self) -> AnalyticsOutcome<CategorySales>;

    /// DELIVERED orders per day over `from..=to`, every day included
    async fn daily_sales(&self, from: NaiveDate, to: NaiveDate)
        -> AnalyticsOutcome<Vec<DailySales>>;

    async fn summary(&self) -> AnalyticsOutcome<SalesSummary>;

    /// Best sellers, recomputed whenever orders or products change
    fn watch_top_selling(&self, limit: u64)
        -> BoxStream<'static, AnalyticsOutcome<Vec<ProductSales>>>;

    /// Category revenue, recomputed whenever orders or products change
    fn watch_sales_by_category(&self) -> BoxStream<'static, AnalyticsOutcome<CategorySales>>;
}

/// Concrete implementation of AnalyticsService using Unit of Work.
pub struct SalesAnalytics<U: UnitOfWork> {
    uow: Arc<U>,
    basis: RevenueBasis,
}

impl<U: UnitOfWork> SalesAnalytics<U> {
    pub fn new(uow: Arc<U>, basis: RevenueBasis) -> Self {
        Self { uow, basis }
    }
}

fn quantity_and_revenue(items: &[OrderItem]) -> (i64, Decimal) {
    items.iter().fold((0, Decimal::ZERO), |(quantity, revenue), item| {
        (quantity + i64::from(item.quantity), revenue + item.line_total())
    })
}

async fn top_selling<U: UnitOfWork>(uow: &U, limit: u64) -> AppResult<Vec<ProductSales>> {
    let ranked = uow.orders().top_product_quantities(limit).await?;

    let lookups: Vec<_> = ranked
        .iter()
        .map(|row| async move {
            let (product, items) = parallel::join2(
                uow.products().find_by_id(row.product_id),
                uow.orders().items_for_product(row.product_id),
            )
            .await?;

            // Deleted products drop out of the ranking
            Ok::<_, AppError>(product.map(|product| {
                let (quantity_sold, revenue) = quantity_and_revenue(&items);
                ProductSales {
                    product,
                    quantity_sold,
                    revenue,
                }
            }))
        })
        .collect();

    let sales = parallel::join_all(lookups).await?;
    Ok(sales.into_iter().flatten().collect())
}

async fn sales_by_category<U: UnitOfWork>(
    uow: &U,
    basis: RevenueBasis,
) -> AppResult<CategorySales> {
    let items = uow.orders().delivered_items().await?;

    let mut ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let products: HashMap<i64, _> = uow
        .products()
        .find_many(ids)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let mut sales = CategorySales::default();
    for item in &items {
        let Some(product) = products.get(&item.product_id) else {
            continue;
        };
        let price = match basis {
            RevenueBasis::Live => product.price,
            RevenueBasis::Snapshot => item.price_per_item,
        };
        sales.add(product.category, price * Decimal::from(item.quantity));
    }

    Ok(sales)
}

/// The category breakdown is never `Empty`: a shop without sales still
/// lists every category at zero.
fn category_outcome(result: AppResult<CategorySales>) -> AnalyticsOutcome<CategorySales> {
    AnalyticsOutcome::from_result(result, |_| false)
}

async fn daily_sales<U: UnitOfWork>(
    uow: &U,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<DailySales>> {
    if to < from {
        return Err(AppError::validation("End date is before start date"));
    }
    if (to - from).num_days() >= MAX_DAILY_SALES_DAYS {
        return Err(AppError::validation(format!(
            "Daily sales cover at most {} days",
            MAX_DAILY_SALES_DAYS
        )));
    }
    let until = to
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::validation("End date is out of range"))?;

    let orders = uow
        .orders()
        .delivered_between(
            from.and_time(NaiveTime::MIN).and_utc(),
            until.and_time(NaiveTime::MIN).and_utc(),
        )
        .await?;

    let mut days: BTreeMap<NaiveDate, DailySales> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|date| {
            (
                date,
                DailySales {
                    date,
                    order_count: 0,
                    revenue: Decimal::ZERO,
                },
            )
        })
        .collect();

    for order in orders {
        if let Some(day) = days.get_mut(&order.order_date.date_naive()) {
            day.order_count += 1;
            day.revenue += order.total_amount;
        }
    }

    Ok(days.into_values().collect())
}

async fn summary<U: UnitOfWork>(uow: &U) -> AppResult<SalesSummary> {
    let (total_orders, delivered) = parallel::join2(
        uow.orders().count(),
        uow.orders().list_by_status(OrderStatus::Delivered),
    )
    .await?;

    let revenue = delivered.iter().map(|order| order.total_amount).sum();
    Ok(SalesSummary::new(total_orders, delivered.len() as u64, revenue))
}

#[async_trait]
impl<U: UnitOfWork + 'static> AnalyticsService for SalesAnalytics<U> {
    async fn top_selling(&self, limit: u64) -> AnalyticsOutcome<Vec<ProductSales>> {
        AnalyticsOutcome::from_result(top_selling(&*self.uow, limit).await, Vec::is_empty)
    }

    async fn sales_by_category(&self) -> AnalyticsOutcome<CategorySales> {
        category_outcome(sales_by_category(&*self.uow, self.basis).await)
    }

    async fn daily_sales(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AnalyticsOutcome<Vec<DailySales>> {
        AnalyticsOutcome::from_result(daily_sales(&*self.uow, from, to).await, |days| {
            days.iter().all(|day| day.order_count == 0)
        })
    }

    async fn summary(&self) -> AnalyticsOutcome<SalesSummary> {
        AnalyticsOutcome::from_result(summary(&*self.uow).await, |s| s.total_orders == 0)
    }

    fn watch_top_selling(
        &self,
        limit: u64,
    ) -> BoxStream<'static, AnalyticsOutcome<Vec<ProductSales>>> {
        let uow = self.uow.clone();
        self.uow.changes().watch(SALES_TABLES, move || {
            let uow = uow.clone();
            async move { AnalyticsOutcome::from_result(top_selling(&*uow, limit).await, Vec::is_empty) }
        })
    }

    fn watch_sales_by_category(&self) -> BoxStream<'static, AnalyticsOutcome<CategorySales>> {
        let uow = self.uow.clone();
        let basis = self.basis;
        self.uow.changes().watch(SALES_TABLES, move || {
            let uow = uow.clone();
            async move { category_outcome(sales_by_category(&*uow, basis).await) }
        })
    }
}
