//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Money columns hold integer cents.

pub mod cart_item;
pub mod favorite_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;
