//! Repository layer - Data access abstraction
//!
//! One repository per aggregate, each a mockable trait plus a SeaORM
//! backed store. Stores publish the tables they write to the change feed
//! so observed queries re-run.

pub(crate) mod cart_repository;
pub(crate) mod entities;
mod favorite_repository;
pub(crate) mod order_repository;
pub(crate) mod product_repository;
mod user_repository;

pub use cart_repository::{CartRepository, CartStore};
pub use favorite_repository::{FavoriteRepository, FavoriteStore};
pub use order_repository::{OrderRepository, OrderStore, ProductQuantity};
pub use product_repository::{ProductRepository, ProductStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use cart_repository::MockCartRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use favorite_repository::MockFavoriteRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
