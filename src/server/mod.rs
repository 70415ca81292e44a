//! Server module for Catalyst
//!
//! - `config`: configuration structures
//! - `loader`: configuration loading from files and environment
//! - `validation`: configuration and production checks
//! - `init`: router construction and the HTTP run loop

pub mod config;
mod init;
mod loader;
mod validation;

pub use init::{init_from_env, run};
