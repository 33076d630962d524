//! Core types for StackFood.
//!
//! This module provides type-safe wrappers for account concepts.

pub mod email;
pub mod id;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{AccountRole, RoleError};
