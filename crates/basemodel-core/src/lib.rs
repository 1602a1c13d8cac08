//! basemodel-core: shared types for the basemodel workspace.
//!
//! - **Error Handling**: the unified [`Error`] type and [`Result`] alias
//! - **Naming**: [`naming::title_to_snake`], the type-name to table-name rule
//! - **Connection strings**: [`url::DatabaseUrl`]
//!
//! # Examples
//!
//! ```
//! use basemodel_core::naming::title_to_snake;
//! use basemodel_core::url::DatabaseUrl;
//!
//! assert_eq!(title_to_snake("OrderItem"), "order_item");
//!
//! let url = DatabaseUrl::parse("sqlite:///db.sqlite3").unwrap();
//! assert!(!url.is_memory());
//! ```

pub mod error;
pub mod naming;
pub mod url;

pub use error::{Error, Result};
pub use url::DatabaseUrl;
