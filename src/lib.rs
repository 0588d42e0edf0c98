//! Shopkeeper - an on-device shop back end
//!
//! Users browse a product catalog, keep a cart and favorites, and place
//! orders that take stock atomically. Managers maintain the catalog, move
//! orders through their lifecycle, read sales analytics and export
//! spreadsheets. Everything is stored in SQLite.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Persistence, change notifications and the session file
//! - **types**: Shared types (pagination)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! shopkeeper register alex --email alex@example.com --password '...'
//! shopkeeper login alex --password '...'
//! shopkeeper products list --category shoes --available
//! shopkeeper cart add 12 2
//! shopkeeper orders checkout --name Alex --phone 555-0100 \
//!     --email alex@example.com --address '1 Main St'
//! shopkeeper stats top --limit 10
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Password, Session, User, UserRole};
pub use errors::{AppError, AppResult};
