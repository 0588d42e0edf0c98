//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

// =============================================================================
// User Roles
// =============================================================================

/// Role assigned to shoppers
pub const ROLE_CUSTOMER: &str = "CUSTOMER";

/// Role allowed to manage the catalog, orders and analytics
pub const ROLE_MANAGER: &str = "MANAGER";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_CUSTOMER, ROLE_MANAGER];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Database
// =============================================================================

/// Default database location (file next to the working directory)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://shopkeeper.db?mode=rwc";

/// Default connection pool size for file databases
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Schema version applied by the migrator
pub const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Session
// =============================================================================

/// Default location of the persisted session
pub const DEFAULT_SESSION_PATH: &str = ".shopkeeper/session.json";

/// Namespace of the persisted session record
pub const SESSION_NAMESPACE: &str = "shop_session";

// =============================================================================
// Change feed
// =============================================================================

/// Buffered change events per subscriber before it starts lagging
pub const CHANGE_FEED_CAPACITY: usize = 64;

// =============================================================================
// Analytics & Export
// =============================================================================

/// Default number of products in the top sellers list
pub const DEFAULT_TOP_SELLERS_LIMIT: u64 = 5;

/// Products at or below this quantity are reported as low stock
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Longest date range, in days, a daily sales report covers
pub const MAX_DAILY_SALES_DAYS: i64 = 366;

/// Default directory for spreadsheet exports
pub const DEFAULT_EXPORT_DIR: &str = "exports";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 8;
