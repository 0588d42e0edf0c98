//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::domain::{Category, OrderStatus, UserRole};

/// Shopkeeper - catalog, cart, checkout and sales analytics for a small shop
#[derive(Parser, Debug)]
#[command(name = "shopkeeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    #[command(flatten)]
    Shop(ShopCommand),
}

/// Commands that run against a migrated database with the stored session
#[derive(Subcommand, Debug)]
pub enum ShopCommand {
    /// Create an account
    Register(RegisterArgs),

    /// Sign in; the session is kept until logout
    Login(LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// View or edit the signed-in account
    Profile(ProfileArgs),

    /// Browse and manage the catalog
    Products(ProductsArgs),

    /// Manage the shopping cart
    Cart(CartArgs),

    /// Manage favorite products
    Favorites(FavoritesArgs),

    /// Checkout and order tracking
    Orders(OrdersArgs),

    /// Sales analytics (managers)
    Stats(StatsArgs),

    /// Write spreadsheets (managers)
    Export(ExportArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    pub username: String,

    #[arg(long, env = "SHOPKEEPER_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// customer or manager
    #[arg(long, default_value = "customer")]
    pub role: UserRole,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub username: String,

    #[arg(long, env = "SHOPKEEPER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    Show,
    /// Change contact details; omitted fields stay as they are
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Parser, Debug)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub action: ProductsAction,
}

/// Product fields shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct ProductFields {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProductsAction {
    List {
        #[arg(long)]
        category: Option<Category>,
        /// Name contains (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// Only products in stock
        #[arg(long)]
        available: bool,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        per_page: u64,
    },
    Show {
        id: i64,
    },
    /// Products running out of stock (managers)
    LowStock,
    /// Add a product (managers)
    Add {
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        category: Category,
        #[arg(long, default_value_t = 0)]
        quantity: i32,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Edit a product (managers)
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        quantity: Option<i32>,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Set the stock level (managers)
    Stock {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        quantity: i32,
    },
    /// Remove a product (managers)
    Delete {
        id: i64,
    },
}

#[derive(Parser, Debug)]
pub struct CartArgs {
    #[command(subcommand)]
    pub action: CartAction,
}

#[derive(Subcommand, Debug)]
pub enum CartAction {
    List,
    Add {
        product_id: i64,
        #[arg(default_value_t = 1)]
        quantity: i32,
    },
    /// Set the quantity of a line; 0 removes it
    Set {
        product_id: i64,
        quantity: i32,
    },
    Remove {
        product_id: i64,
    },
    Clear,
}

#[derive(Parser, Debug)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub action: FavoritesAction,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesAction {
    List,
    Toggle { product_id: i64 },
}

#[derive(Parser, Debug)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub action: OrdersAction,
}

#[derive(Subcommand, Debug)]
pub enum OrdersAction {
    /// Place an order for everything in the cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        delivery_price: Option<Decimal>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        /// Every customer's orders (managers)
        #[arg(long)]
        all: bool,
        /// Only orders in this status (managers)
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    Show {
        id: i64,
    },
    /// Move an order to another status (managers)
    Status {
        id: i64,
        status: OrderStatus,
    },
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub action: StatsAction,
}

#[derive(Subcommand, Debug)]
pub enum StatsAction {
    /// Best sellers by units sold
    Top {
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Delivered revenue per category
    Categories,
    /// Delivered sales per day, both ends inclusive
    Daily {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    Summary,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub document: ExportDocument,

    /// Output file; defaults to a timestamped file in EXPORT_DIR
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDocument {
    Products,
    Orders,
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_typed_values() {
        let cli = Cli::parse_from([
            "shopkeeper",
            "products",
            "add",
            "Runner",
            "--price",
            "59.90",
            "--category",
            "SHOES",
            "--quantity",
            "3",
            "--size",
            "42",
        ]);

        match cli.command {
            Commands::Shop(ShopCommand::Products(ProductsArgs {
                action:
                    ProductsAction::Add {
                        name,
                        price,
                        category,
                        quantity,
                        fields,
                    },
            })) => {
                assert_eq!(name, "Runner");
                assert_eq!(price, Decimal::new(5990, 2));
                assert_eq!(category, Category::Shoes);
                assert_eq!(quantity, 3);
                assert_eq!(fields.size.as_deref(), Some("42"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        let result = Cli::try_parse_from(["shopkeeper", "orders", "status", "1", "LOST"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_out_after_document() {
        let cli = Cli::parse_from(["shopkeeper", "export", "orders", "--out", "orders.csv"]);
        match cli.command {
            Commands::Shop(ShopCommand::Export(args)) => {
                assert_eq!(args.document, ExportDocument::Orders);
                assert_eq!(args.out, Some(PathBuf::from("orders.csv")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
