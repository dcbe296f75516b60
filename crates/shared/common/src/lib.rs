//! Common utilities shared across all microservices.
//!
//! This crate provides:
//! - Unified error handling for HTTP handlers
//! - A validating JSON extractor and the health check body
//! - Configuration structures
//! - Database connection and migration management (feature `database`)
//! - JWT issuing and verification (feature `jwt`)

pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod error;
pub mod http;
#[cfg(feature = "jwt")]
pub mod jwt;

pub use config::*;
#[cfg(feature = "database")]
pub use database::{Database, MigrateAction};
pub use error::{AppError, AppResult};
