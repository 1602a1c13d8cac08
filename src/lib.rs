//! basemodel - entity persistence helpers and migration tooling
//!
//! Re-exports the storage layer from `basemodel-db` and adds the pieces the
//! `manage` binary is built from.

pub mod config;
pub mod migrate;

pub use basemodel_db::*;
