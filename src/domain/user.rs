//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{is_valid_role, ROLE_CUSTOMER, ROLE_MANAGER};
use crate::errors::AppError;

/// User roles enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    Customer,
    Manager,
}

impl UserRole {
    /// Check if this role may manage the shop
    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Manager)
    }

    /// Check if this role can access a required role
    pub fn can_access(&self, required: &UserRole) -> bool {
        match self {
            UserRole::Manager => true,
            UserRole::Customer => matches!(required, UserRole::Customer),
        }
    }

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => ROLE_CUSTOMER,
            UserRole::Manager => ROLE_MANAGER,
        }
    }
}

/// Lenient conversion for stored values; unknown roles read as customer.
impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_MANAGER => UserRole::Manager,
            _ => UserRole::Customer,
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if !is_valid_role(&upper) {
            return Err(AppError::validation(format!("Unknown role: {}", s)));
        }
        Ok(UserRole::from(upper.as_str()))
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
}

impl User {
    /// Check if user has the manager role
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Name to show on receipts, falling back to the username
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// Registration form
#[derive(Debug, Clone, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
}

/// Profile edit form; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileUpdate {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert_eq!("CUSTOMER".parse::<UserRole>().unwrap(), UserRole::Customer);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_access() {
        assert!(UserRole::Manager.can_access(&UserRole::Customer));
        assert!(!UserRole::Customer.can_access(&UserRole::Manager));
    }

    #[test]
    fn test_unknown_stored_role_reads_as_customer() {
        assert_eq!(UserRole::from("SUPERUSER"), UserRole::Customer);
    }

    #[test]
    fn test_register_validation() {
        let form = RegisterUser {
            username: "al".to_string(),
            password: "short".to_string(),
            email: "al@example.com".to_string(),
            full_name: None,
            phone: None,
            address: None,
            role: UserRole::Customer,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("password"));
        assert!(!errors.field_errors().contains_key("email"));
    }
}
