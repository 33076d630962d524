//! Domain models for the web server.
//!
//! Account types are validated domain objects, separate from database rows.

pub mod account;
pub mod session;

pub use account::{Account, NewAccount};
pub use session::{CurrentAccount, keys as session_keys};
