//! Stats command - sales analytics for managers.

use super::manager;
use crate::cli::args::{StatsAction, StatsArgs};
use crate::config::Config;
use crate::domain::AnalyticsOutcome;
use crate::errors::{AppError, AppResult};
use crate::services::ServiceContainer;

/// Execute a stats subcommand
pub async fn execute(
    args: StatsArgs,
    services: &dyn ServiceContainer,
    config: &Config,
) -> AppResult<()> {
    manager(services).await?;
    let analytics = services.analytics();

    match args.action {
        StatsAction::Top { limit } => {
            let limit = limit.unwrap_or(config.top_sellers_limit);
            if let Some(top) = delivered(analytics.top_selling(limit).await)? {
                for (rank, sale) in top.iter().enumerate() {
                    println!(
                        "{:>2}. {:<32} {:>6} sold {:>12}",
                        rank + 1,
                        sale.product.name,
                        sale.quantity_sold,
                        sale.revenue
                    );
                }
            }
        }
        StatsAction::Categories => {
            if let Some(sales) = delivered(analytics.sales_by_category().await)? {
                for (category, revenue) in sales.iter() {
                    println!("{:<20} {:>12}", category.display_name(), revenue);
                }
                println!("{:<20} {:>12}", "Total", sales.total());
            }
        }
        StatsAction::Daily { from, to } => {
            if let Some(days) = delivered(analytics.daily_sales(from, to).await)? {
                for day in days {
                    println!("{}  {:>4} orders {:>12}", day.date, day.order_count, day.revenue);
                }
            }
        }
        StatsAction::Summary => {
            if let Some(summary) = delivered(analytics.summary().await)? {
                println!("Orders:           {}", summary.total_orders);
                println!("Delivered:        {}", summary.delivered_orders);
                println!("Revenue:          {}", summary.delivered_revenue);
                println!("Average order:    {}", summary.average_order_value);
            }
        }
    }

    Ok(())
}

/// Unwrap a figure, printing a notice when there is nothing to show yet.
fn delivered<T>(outcome: AnalyticsOutcome<T>) -> AppResult<Option<T>> {
    match outcome {
        AnalyticsOutcome::Ready(value) => Ok(Some(value)),
        AnalyticsOutcome::Empty => {
            println!("No sales yet");
            Ok(None)
        }
        AnalyticsOutcome::Failed(message) => Err(AppError::internal(message)),
    }
}
