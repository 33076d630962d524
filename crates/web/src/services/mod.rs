//! Business logic services.
//!
//! # Services
//!
//! - `accounts` - Account lookup, creation, deletion and credential checks
//! - `registration` - Sign-up form validation and the registration flow

pub mod accounts;
pub mod registration;

pub use accounts::{AccountError, AccountService};
pub use registration::{Field, FieldErrors, RegisterError, RegisterForm};
