//! Shopping cart entities.

use rust_decimal::Decimal;
use serde::Serialize;

use super::product::Product;

/// Stored cart row, keyed by (user, product)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

/// Cart row joined with its product
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    /// Stock dropped below the quantity in the cart since it was added
    pub fn exceeds_stock(&self) -> bool {
        !self.product.has_stock_for(self.quantity)
    }
}

/// Whole cart with its running total
#[derive(Debug, Clone, Default, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: i64,
}

impl CartSummary {
    pub fn new(lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();
        Self {
            lines,
            total,
            item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
