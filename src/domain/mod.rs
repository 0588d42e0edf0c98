//! Domain layer - Core business entities and logic
//!
//! This module contains the shop's domain models, independent of the
//! store they are persisted in: users and sessions, the product catalog,
//! carts, favorites, orders and the shapes returned by sales analytics.

pub mod analytics;
pub mod cart;
pub mod favorite;
pub mod money;
pub mod order;
pub mod password;
pub mod product;
pub mod session;
pub mod user;

pub use analytics::{
    AnalyticsOutcome, CategorySales, DailySales, ProductSales, RevenueBasis, SalesSummary,
};
pub use cart::{CartItem, CartLine, CartSummary};
pub use favorite::FavoriteItem;
pub use order::{
    CheckoutDetails, NewOrder, Order, OrderDetails, OrderItem, OrderLine, OrderStatus,
};
pub use password::Password;
pub use product::{Category, NewProduct, Product, ProductFilter, ProductUpdate};
pub use session::Session;
pub use user::{ProfileUpdate, RegisterUser, User, UserRole};
