//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod analytics_service;
mod auth_service;
mod cart_service;
pub mod container;
mod export_service;
mod favorite_service;
mod order_service;
mod product_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use analytics_service::{AnalyticsService, SalesAnalytics};
pub use auth_service::{AuthService, Authenticator};
pub use cart_service::{CartManager, CartService};
pub use export_service::{ExportService, SpreadsheetExporter};
pub use favorite_service::{FavoriteManager, FavoriteService};
pub use order_service::{OrderManager, OrderService};
pub use product_service::{ProductCatalog, ProductService};
pub use user_service::{UserManager, UserService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
