//! Unified error type for basemodel.
//!
//! Storage failures are wrapped, never translated: the original
//! `rusqlite` / `r2d2` error stays reachable through [`std::error::Error::source`].

use std::fmt;
use std::path::PathBuf;

/// Unified error type covering all failure modes in basemodel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A storage operation failed (connectivity, constraint violation, ...).
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A query referenced a column the entity does not declare.
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn {
        /// Table the query was scoped to.
        table: String,
        /// The offending column name.
        column: String,
    },

    /// An operation that needs a stored row was called on an unsaved entity.
    #[error("{entity} has not been persisted")]
    NotPersisted {
        /// Type name of the entity.
        entity: String,
    },

    /// The connection string could not be understood.
    #[error("Invalid database url: {0}")]
    InvalidUrl(String),

    /// A configuration file that must exist was not found.
    #[error("Config file not found: {}", .0.display())]
    ConfigFileMissing(PathBuf),

    /// A configuration file does not contain the expected entry.
    #[error("No line starting with '{key}' in {}", .path.display())]
    ConfigKeyMissing {
        /// File that was searched.
        path: PathBuf,
        /// Key that was expected at the start of a line.
        key: String,
    },

    /// An external tool could not be started or located.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::UnknownColumn`].
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Convenience constructor for [`Error::NotPersisted`].
    pub fn not_persisted(entity: impl fmt::Display) -> Self {
        Error::NotPersisted {
            entity: entity.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the storage layer.
    pub fn is_database(&self) -> bool {
        matches!(self, Error::Database { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
