//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use stackfood_core::{AccountId, AccountRole, Email};

use super::account::Account;

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAccount {
    /// Account's database ID.
    pub id: AccountId,
    /// Account's email address.
    pub email: Email,
    /// First name, used for greetings.
    pub first_name: String,
    /// Access level at sign-in time.
    pub role: AccountRole,
}

impl From<&Account> for CurrentAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            role: account.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in account.
    pub const CURRENT_ACCOUNT: &str = "current_account";
}
