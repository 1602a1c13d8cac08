//! basemodel-db: base entity, unit-of-work session, and schema bootstrap.
//!
//! This crate provides a small CRUD layer over SQLite using rusqlite with
//! r2d2 connection pooling.
//!
//! # Modules
//!
//! - `entity` - The [`Entity`] trait and the [`entity!`] declaration macro
//! - `session` - [`Session`], one unit of work over one pooled connection
//! - `database` - [`Database`], the pool plus registered table definitions
//! - `query` - Lazy [`Query`] handles scoped to one table
//! - `criterion` - Predicate builder used by `filter` and `exists`
//! - `schema` - Table definitions and `CREATE TABLE` generation
//!
//! # Example
//!
//! ```
//! use basemodel_db::{entity, Database, Entity};
//!
//! entity! {
//!     pub struct Widget {
//!         pub name: String,
//!     }
//! }
//!
//! let db = Database::memory().register::<Widget>().build().unwrap();
//! let session = db.session().unwrap();
//!
//! let widget = Widget { name: "sprocket".into(), ..Default::default() }
//!     .create(&session)
//!     .unwrap();
//! assert_eq!(Widget::table_name(), "widget");
//! assert_eq!(Widget::count(&session).unwrap(), 1);
//! println!("Created {widget}");
//! ```

pub mod column;
pub mod criterion;
pub mod database;
pub mod entity;
pub mod query;
pub mod record;
pub mod schema;
pub mod session;
pub mod value;

pub use basemodel_core::{DatabaseUrl, Error, Result};
pub use rusqlite;
pub use rusqlite::types::Value;

pub use column::{Column, ColumnType, SqlType};
pub use criterion::{col, Criterion};
pub use database::{Database, DatabaseBuilder, DbPool};
pub use entity::{DeleteAll, Entity, EntityMeta};
pub use query::{Order, Query};
pub use record::Record;
pub use schema::TableDef;
pub use session::Session;
pub use value::IntoValue;
