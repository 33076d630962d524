//! StackFood web server library.
//!
//! Landing page, registration, sign-in and account pages, exposed as a
//! library so the router can be exercised in-process by tests and reused by
//! the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
