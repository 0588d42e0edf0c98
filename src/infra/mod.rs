//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection, schema and repositories
//! - The change feed behind observed queries
//! - The key-value session file
//! - Unit of Work for transaction management

pub mod changes;
pub mod db;
pub mod repositories;
pub mod session_store;
pub mod unit_of_work;

pub use changes::{ChangeFeed, Table};
pub use db::{Database, Migrator};
pub use repositories::{
    CartRepository, FavoriteRepository, OrderRepository, ProductQuantity, ProductRepository,
    UserRepository,
};
pub use session_store::{FileSessionStore, SessionStore, StoredSession};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use session_store::MockSessionStore;
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::TestUnitOfWork;
