//! Spreadsheet export of the catalog, the orders and the sales figures.
//!
//! Each document is one CSV sheet with a fixed column layout, written on
//! the blocking pool.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::analytics_service::AnalyticsService;
use crate::domain::ProductFilter;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

const PRODUCT_COLUMNS: &[&str] = &[
    "ID",
    "Name",
    "Description",
    "Category",
    "Price",
    "Quantity",
    "Available",
    "Size",
    "Color",
];

const ORDER_COLUMNS: &[&str] = &[
    "Order ID",
    "User ID",
    "Date",
    "Status",
    "Customer",
    "Phone",
    "Email",
    "Address",
    "Total",
    "Delivery",
    "Payment",
    "Notes",
];

const STATS_COLUMNS: &[&str] = &["Section", "Name", "Quantity", "Revenue"];

/// One sheet: header row plus data rows
struct Sheet {
    columns: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

fn write_sheet(path: &Path, sheet: &Sheet) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(sheet.columns)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export service trait for dependency injection.
///
/// Each call returns the path written; `None` picks a timestamped file in
/// the export directory.
#[async_trait]
pub trait ExportService: Send + Sync {
    async fn export_products(&self, out: Option<PathBuf>) -> AppResult<PathBuf>;

    async fn export_orders(&self, out: Option<PathBuf>) -> AppResult<PathBuf>;

    /// Top sellers, category revenue and the headline summary
    async fn export_stats(&self, out: Option<PathBuf>) -> AppResult<PathBuf>;
}

/// Concrete implementation of ExportService.
pub struct SpreadsheetExporter<U: UnitOfWork> {
    uow: Arc<U>,
    analytics: Arc<dyn AnalyticsService>,
    export_dir: PathBuf,
    top_sellers_limit: u64,
}

impl<U: UnitOfWork> SpreadsheetExporter<U> {
    pub fn new(
        uow: Arc<U>,
        analytics: Arc<dyn AnalyticsService>,
        export_dir: PathBuf,
        top_sellers_limit: u64,
    ) -> Self {
        Self {
            uow,
            analytics,
            export_dir,
            top_sellers_limit,
        }
    }

    fn target(&self, out: Option<PathBuf>, stem: &str) -> PathBuf {
        out.unwrap_or_else(|| {
            self.export_dir
                .join(format!("{}_{}.csv", stem, Utc::now().format("%Y%m%d_%H%M%S")))
        })
    }

    async fn write(&self, path: PathBuf, sheet: Sheet) -> AppResult<PathBuf> {
        let rows = sheet.rows.len();
        let path = tokio::task::spawn_blocking(move || write_sheet(&path, &sheet).map(|_| path))
            .await
            .map_err(|e| AppError::internal(format!("Export task failed: {}", e)))??;

        tracing::info!(path = %path.display(), rows, "Spreadsheet written");
        Ok(path)
    }
}

fn optional(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[async_trait]
impl<U: UnitOfWork> ExportService for SpreadsheetExporter<U> {
    async fn export_products(&self, out: Option<PathBuf>) -> AppResult<PathBuf> {
        let products = self.uow.products().list(ProductFilter::default()).await?;

        let rows = products
            .into_iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.name.clone(),
                    p.description.clone(),
                    p.category.display_name().to_string(),
                    p.price.to_string(),
                    p.quantity.to_string(),
                    if p.is_available() { "Yes" } else { "No" }.to_string(),
                    optional(p.size),
                    optional(p.color),
                ]
            })
            .collect();

        let sheet = Sheet {
            columns: PRODUCT_COLUMNS,
            rows,
        };
        self.write(self.target(out, "products"), sheet).await
    }

    async fn export_orders(&self, out: Option<PathBuf>) -> AppResult<PathBuf> {
        let orders = self.uow.orders().list_all().await?;

        let rows = orders
            .into_iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.user_id.to_string(),
                    o.order_date.format("%Y-%m-%d %H:%M").to_string(),
                    o.status.display_name().to_string(),
                    o.customer_name,
                    o.customer_phone,
                    o.customer_email,
                    o.customer_address,
                    o.total_amount.to_string(),
                    optional(o.delivery_price),
                    optional(o.payment_method),
                    optional(o.notes),
                ]
            })
            .collect();

        let sheet = Sheet {
            columns: ORDER_COLUMNS,
            rows,
        };
        self.write(self.target(out, "orders"), sheet).await
    }

    async fn export_stats(&self, out: Option<PathBuf>) -> AppResult<PathBuf> {
        let top = self
            .analytics
            .top_selling(self.top_sellers_limit)
            .await
            .into_result()?;
        let categories = self.analytics.sales_by_category().await.into_result()?;
        let summary = self.analytics.summary().await.into_result()?;

        let mut rows: Vec<Vec<String>> = top
            .iter()
            .map(|sale| {
                vec![
                    "Top product".to_string(),
                    sale.product.name.clone(),
                    sale.quantity_sold.to_string(),
                    sale.revenue.to_string(),
                ]
            })
            .collect();

        rows.extend(categories.iter().map(|(category, revenue)| {
            vec![
                "Category".to_string(),
                category.display_name().to_string(),
                String::new(),
                revenue.to_string(),
            ]
        }));

        rows.push(vec![
            "Summary".to_string(),
            "Delivered orders".to_string(),
            summary.delivered_orders.to_string(),
            summary.delivered_revenue.to_string(),
        ]);
        rows.push(vec![
            "Summary".to_string(),
            "All orders".to_string(),
            summary.total_orders.to_string(),
            String::new(),
        ]);
        rows.push(vec![
            "Summary".to_string(),
            "Average delivered order".to_string(),
            String::new(),
            summary.average_order_value.to_string(),
        ]);

        let sheet = Sheet {
            columns: STATS_COLUMNS,
            rows,
        };
        self.write(self.target(out, "stats"), sheet).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AnalyticsOutcome, CategorySales, DailySales, Category, Product, ProductSales,
        SalesSummary,
    };
    use crate::infra::repositories::MockProductRepository;
    use crate::infra::TestUnitOfWork;
    use chrono::NaiveDate;
    use futures::stream::{self, BoxStream, StreamExt};
    use rust_decimal::Decimal;

    struct FailingAnalytics;

    #[async_trait]
    impl AnalyticsService for FailingAnalytics {
        async fn top_selling(&self, _limit: u64) -> AnalyticsOutcome<Vec<ProductSales>> {
            AnalyticsOutcome::Failed("database is locked".to_string())
        }

        async fn sales_by_category(&self) -> AnalyticsOutcome<CategorySales> {
            AnalyticsOutcome::Empty
        }

        async fn daily_sales(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> AnalyticsOutcome<Vec<DailySales>> {
            AnalyticsOutcome::Empty
        }

        async fn summary(&self) -> AnalyticsOutcome<SalesSummary> {
            AnalyticsOutcome::Empty
        }

        fn watch_top_selling(
            &self,
            _limit: u64,
        ) -> BoxStream<'static, AnalyticsOutcome<Vec<ProductSales>>> {
            stream::empty().boxed()
        }

        fn watch_sales_by_category(
            &self,
        ) -> BoxStream<'static, AnalyticsOutcome<CategorySales>> {
            stream::empty().boxed()
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shopkeeper-export-{}", std::process::id()))
            .join(name)
    }

    fn exporter(products: MockProductRepository) -> SpreadsheetExporter<TestUnitOfWork> {
        let uow = TestUnitOfWork {
            products: Arc::new(products),
            ..Default::default()
        };
        SpreadsheetExporter::new(
            Arc::new(uow),
            Arc::new(FailingAnalytics),
            std::env::temp_dir(),
            5,
        )
    }

    #[tokio::test]
    async fn test_products_sheet_layout() {
        let mut products = MockProductRepository::new();
        products.expect_list().returning(|_| {
            Ok(vec![Product {
                id: 1,
                name: "Trail shoes, waterproof".to_string(),
                description: "Grippy".to_string(),
                price: Decimal::new(8999, 2),
                category: Category::Shoes,
                image_url: String::new(),
                quantity: 0,
                size: Some("43".to_string()),
                color: None,
            }])
        });

        let path = temp_file("products.csv");
        let written = exporter(products)
            .export_products(Some(path.clone()))
            .await
            .unwrap();
        assert_eq!(written, path);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, PRODUCT_COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "Trail shoes, waterproof");
        assert_eq!(&rows[0][4], "89.99");
        assert_eq!(&rows[0][6], "No");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_failed_analytics_aborts_stats_export() {
        let path = temp_file("stats.csv");
        let result = exporter(MockProductRepository::new())
            .export_stats(Some(path.clone()))
            .await;

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
