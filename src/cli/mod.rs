//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `register` / `login` / `logout` / `whoami` / `profile` - Accounts
//! - `products`, `cart`, `favorites`, `orders` - Shopping
//! - `stats`, `export` - Manager reporting

pub mod args;

pub use args::{Cli, Commands, ShopCommand};
