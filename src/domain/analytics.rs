//! Sales analytics result shapes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::product::{Category, Product};
use crate::errors::{AppError, AppResult};

/// Price used when summing category revenue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevenueBasis {
    /// Quantity times the product's current price
    #[default]
    Live,
    /// Quantity times the price recorded on the order item
    Snapshot,
}

impl std::str::FromStr for RevenueBasis {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(RevenueBasis::Live),
            "snapshot" => Ok(RevenueBasis::Snapshot),
            other => Err(AppError::validation(format!("Unknown revenue basis: {}", other))),
        }
    }
}

/// Result of an analytics query.
///
/// Analytics never return an error to the caller; a failed computation is
/// reported as `Failed` so "no sales yet" and "query failed" stay distinct.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsOutcome<T> {
    Ready(T),
    Empty,
    Failed(String),
}

impl<T> AnalyticsOutcome<T> {
    /// Classify a computed result, logging failures.
    pub fn from_result(result: AppResult<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(value) if is_empty(&value) => AnalyticsOutcome::Empty,
            Ok(value) => AnalyticsOutcome::Ready(value),
            Err(e) => {
                tracing::warn!(error = ?e, "Analytics query failed");
                AnalyticsOutcome::Failed(e.user_message())
            }
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            AnalyticsOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AnalyticsOutcome::Failed(_))
    }

    /// Collapse to a value, treating `Empty` as the default and turning a
    /// failure back into an error.
    pub fn into_result(self) -> AppResult<T>
    where
        T: Default,
    {
        match self {
            AnalyticsOutcome::Ready(value) => Ok(value),
            AnalyticsOutcome::Empty => Ok(T::default()),
            AnalyticsOutcome::Failed(msg) => Err(AppError::internal(msg)),
        }
    }
}

/// Units sold and revenue for one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product: Product,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// Revenue per category; every category is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    totals: BTreeMap<Category, Decimal>,
}

impl Default for CategorySales {
    fn default() -> Self {
        Self {
            totals: Category::ALL
                .into_iter()
                .map(|category| (category, Decimal::ZERO))
                .collect(),
        }
    }
}

impl CategorySales {
    pub fn add(&mut self, category: Category, amount: Decimal) {
        *self.totals.entry(category).or_insert(Decimal::ZERO) += amount;
    }

    pub fn get(&self, category: Category) -> Decimal {
        self.totals.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        self.totals.iter().map(|(c, v)| (*c, *v))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.totals.values().copied().sum()
    }
}

/// Delivered sales for one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub order_count: u64,
    pub revenue: Decimal,
}

/// Headline numbers for the analytics dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_orders: u64,
    pub delivered_orders: u64,
    pub delivered_revenue: Decimal,
    pub average_order_value: Decimal,
}

impl SalesSummary {
    pub fn new(total_orders: u64, delivered_orders: u64, delivered_revenue: Decimal) -> Self {
        let average_order_value = if delivered_orders == 0 {
            Decimal::ZERO
        } else {
            (delivered_revenue / Decimal::from(delivered_orders)).round_dp(2)
        };
        Self {
            total_orders,
            delivered_orders,
            delivered_revenue,
            average_order_value,
        }
    }
}
