//! Shared database schema, migrations, and query builders.
//!
//! Every builder returns a [`Built`] pair of SQL text and bind values; the
//! store decides how to bind and execute them.

pub mod families;
pub mod invitations;
pub mod items;
pub mod migrations;
pub mod reservations;
pub mod tables;
pub mod users;

// Re-export tables for convenience
pub use tables::*;

/// SQL text plus positional bind values.
pub type Built = (String, sea_query::Values);
