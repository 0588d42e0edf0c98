//! Shared setup for integration tests: a migrated in-memory shop with one
//! manager and one customer.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_decimal::Decimal;

use shopkeeper::config::Config;
use shopkeeper::domain::{
    Category, CheckoutDetails, NewProduct, Product, RegisterUser, Session, UserRole,
};
use shopkeeper::infra::Database;
use shopkeeper::services::{ServiceContainer, Services};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

pub struct Shop {
    pub db: Database,
    pub services: Services,
    pub config: Config,
    pub manager: Session,
    pub customer: Session,
}

/// Scratch directory unique to this test process and call.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!(
        "shopkeeper-it-{}-{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::SeqCst)
    ))
}

pub fn test_config() -> Config {
    let dir = scratch_dir();
    let mut config = Config::with_database_url("sqlite::memory:");
    config.session_path = dir.join("session.json");
    config.export_dir = dir.join("exports");
    config
}

/// Shop on a database file with the default connection pool, for tests
/// where several connections touch the data at once.
pub async fn file_shop() -> Shop {
    let mut config = test_config();
    let dir = config.export_dir.parent().map(PathBuf::from).unwrap_or_else(scratch_dir);
    std::fs::create_dir_all(&dir).expect("scratch dir");
    config.database_url = format!("sqlite://{}?mode=rwc", dir.join("shop.db").display());
    shop_with(config).await
}

pub async fn shop() -> Shop {
    shop_with(test_config()).await
}

pub async fn shop_with(config: Config) -> Shop {
    let db = Database::connect(&config).await.expect("database");
    let services = Services::from_connection(db.get_connection(), &config);

    let manager = register(&services, "morgan", UserRole::Manager).await;
    let customer = register(&services, "casey", UserRole::Customer).await;

    Shop {
        db,
        services,
        config,
        manager,
        customer,
    }
}

pub async fn register(services: &Services, username: &str, role: UserRole) -> Session {
    let user = services
        .auth()
        .register(RegisterUser {
            username: username.to_string(),
            password: "correct horse".to_string(),
            email: format!("{}@example.com", username),
            full_name: None,
            phone: None,
            address: None,
            role,
        })
        .await
        .expect("register");
    Session::for_user(&user)
}

impl Shop {
    /// Add a product priced in whole currency units.
    pub async fn product(&self, name: &str, price: i64, quantity: i32, category: Category) -> Product {
        self.services
            .products()
            .create_product(
                &self.manager,
                NewProduct {
                    name: name.to_string(),
                    description: String::new(),
                    price: Decimal::from(price),
                    category,
                    image_url: String::new(),
                    quantity,
                    size: None,
                    color: None,
                },
            )
            .await
            .expect("create product")
    }

    pub async fn stock_of(&self, product_id: i64) -> i32 {
        self.services
            .products()
            .get_product(product_id)
            .await
            .expect("product")
            .quantity
    }

    pub async fn add_to_cart(&self, session: &Session, product_id: i64, quantity: i32) {
        self.services
            .carts()
            .add_to_cart(session, product_id, quantity)
            .await
            .expect("add to cart");
    }
}

pub fn checkout() -> CheckoutDetails {
    CheckoutDetails {
        customer_name: "Casey Reed".to_string(),
        customer_phone: "555-0134".to_string(),
        customer_email: "casey@example.com".to_string(),
        customer_address: "22 Harbor Road".to_string(),
        delivery_price: Some(Decimal::from(5)),
        payment_method: Some("card".to_string()),
        notes: None,
    }
}
