//! Order entities and the status lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::product::Product;
use crate::errors::AppError;

/// Order status.
///
/// The usual path is PENDING → PROCESSING → SHIPPED → DELIVERED, with
/// CANCELLED reachable from anywhere. Managers may set any status; no
/// transition table is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable name shown in listings and exports
    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// No further progress is expected
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::validation(format!("Unknown order status: {}", s)))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Order header with the contact details captured at checkout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub customer_address: String,
    pub delivery_price: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Stored order line, keyed by (order, product)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price_per_item: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price_per_item * Decimal::from(self.quantity)
    }
}

/// Order line as shown to people: the snapshot price plus the product
/// name when the product still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price_per_item: Decimal,
}

impl OrderLine {
    /// Capture the product's current price for `quantity` units
    pub fn snapshot(product: &Product, quantity: i32) -> Self {
        Self {
            product_id: product.id,
            product_name: Some(product.name.clone()),
            quantity,
            price_per_item: product.price,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price_per_item * Decimal::from(self.quantity)
    }
}

/// Order together with its lines
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderDetails {
    pub fn items_total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

fn validate_delivery_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("delivery_price");
        err.message = Some("Delivery price cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Checkout form
#[derive(Debug, Clone, Validate)]
pub struct CheckoutDetails {
    #[validate(length(min = 1, message = "Name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub customer_phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub customer_address: String,
    #[validate(custom(function = "validate_delivery_price"))]
    pub delivery_price: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Order header ready to insert
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub checkout: CheckoutDetails,
}

impl NewOrder {
    /// Pending order whose total is the sum of the snapshot lines
    pub fn pending(user_id: i64, checkout: CheckoutDetails, lines: &[OrderLine]) -> Self {
        Self {
            user_id,
            order_date: Utc::now(),
            total_amount: lines.iter().map(OrderLine::line_total).sum(),
            status: OrderStatus::Pending,
            checkout,
        }
    }
}
