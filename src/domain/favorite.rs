//! Favorite bookmarks.

use chrono::{DateTime, Utc};

/// Stored favorite, keyed by (user, product)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteItem {
    pub user_id: i64,
    pub product_id: i64,
    pub date_added: DateTime<Utc>,
}
