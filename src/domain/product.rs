//! Product catalog entities.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::AppError;

/// Closed set of catalog categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Electronics,
    Clothing,
    Shoes,
    Accessories,
    Home,
    Beauty,
    Sports,
    Books,
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 9] = [
        Category::Electronics,
        Category::Clothing,
        Category::Shoes,
        Category::Accessories,
        Category::Home,
        Category::Beauty,
        Category::Sports,
        Category::Books,
        Category::Other,
    ];

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "ELECTRONICS",
            Category::Clothing => "CLOTHING",
            Category::Shoes => "SHOES",
            Category::Accessories => "ACCESSORIES",
            Category::Home => "HOME",
            Category::Beauty => "BEAUTY",
            Category::Sports => "SPORTS",
            Category::Books => "BOOKS",
            Category::Other => "OTHER",
        }
    }

    /// Human-readable name shown in listings and exports
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Shoes => "Shoes",
            Category::Accessories => "Accessories",
            Category::Home => "Home & Living",
            Category::Beauty => "Beauty",
            Category::Sports => "Sports & Outdoors",
            Category::Books => "Books",
            Category::Other => "Other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::validation(format!("Unknown category: {}", s)))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Product domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Category,
    pub image_url: String,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl Product {
    /// A product can be bought while any stock remains
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }

    /// Whether `requested` units can be taken from stock
    pub fn has_stock_for(&self, requested: i32) -> bool {
        requested <= self.quantity
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() || price.is_zero() {
        let mut err = ValidationError::new("price");
        err.message = Some("Price must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

/// Catalog entry to create
#[derive(Debug, Clone, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub category: Category,
    pub image_url: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Catalog edit; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Catalog listing filter; the default matches every product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    pub available_only: bool,
}

impl ProductFilter {
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn available() -> Self {
        Self {
            available_only: true,
            ..Self::default()
        }
    }
}
