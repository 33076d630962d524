//! Account domain types.
//!
//! [`Account`] deliberately has no password field: the hash only ever lives
//! inside the store and the account service's verification path.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stackfood_core::{AccountId, AccountRole, Email};

/// A registered StackFood account (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Unique account ID, assigned by the store.
    pub id: AccountId,
    /// Email address, unique across accounts.
    pub email: Email,
    /// Phone number as entered at registration.
    pub phone: String,
    /// First token of the display name.
    pub first_name: String,
    /// Remaining tokens of the display name (may be empty).
    pub last_name: String,
    /// Access level, defaulted by the store.
    pub role: AccountRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Full display name ("Jean Paul Martin"), without a trailing space when
    /// there is no last name.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Fields needed to insert a new account (password is hashed separately).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: Email,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}
