//! Infrastructure layer - schema migrations.

pub mod migrations;

pub use migrations::Migrator;

/// Database handle bound to this service's schema.
pub type Database = common::Database<Migrator>;
