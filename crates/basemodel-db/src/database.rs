//! Engine bootstrap: connection pool plus registered entity tables.
//!
//! A [`Database`] is built once at startup and passed by reference to the
//! code that needs storage. Building it creates the SQLite file if needed,
//! enables foreign keys on every pooled connection, and creates any missing
//! table for the registered entity types.

use std::fmt;
use std::sync::Arc;

use basemodel_core::url::Target;
use basemodel_core::{DatabaseUrl, Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::entity::Entity;
use crate::schema::{self, TableDef};
use crate::session::Session;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const DEFAULT_POOL_SIZE: u32 = 4;

/// Shared, read-only handle to the pool and the registered schema.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    url: DatabaseUrl,
    tables: Arc<[TableDef]>,
}

impl Database {
    /// Start building a database for `url` (e.g. `sqlite:///db.sqlite3`).
    pub fn builder(url: impl Into<String>) -> DatabaseBuilder {
        DatabaseBuilder {
            url: url.into(),
            tables: Vec::new(),
            max_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Start building a private in-memory database (useful for tests).
    pub fn memory() -> DatabaseBuilder {
        Self::builder("sqlite://")
    }

    /// Check out a connection and wrap it in a new unit of work.
    pub fn session(&self) -> Result<Session> {
        let conn = self.pool.get().map_err(|e| {
            Error::database(format!("Failed to get connection from pool: {e}"))
        })?;
        Ok(Session::new(conn))
    }

    pub fn url(&self) -> &DatabaseUrl {
        &self.url
    }

    /// Names of the registered tables, in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Create any registered table that is missing. Safe to call repeatedly.
    pub fn create_all(&self) -> Result<()> {
        let conn = self.pool.get().map_err(|e| {
            Error::database(format!("Failed to get connection for schema creation: {e}"))
        })?;
        schema::create_all(&conn, &self.tables)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("url", &self.url.as_str())
            .field("tables", &self.tables.iter().map(|t| &t.name).collect::<Vec<_>>())
            .finish()
    }
}

/// Collects entity registrations before the pool is created.
#[derive(Debug)]
pub struct DatabaseBuilder {
    url: String,
    tables: Vec<TableDef>,
    max_size: u32,
}

impl DatabaseBuilder {
    /// Register an entity type. Registering a table twice keeps the first.
    pub fn register<E: Entity>(mut self) -> Self {
        let table = E::table();
        if !self.tables.iter().any(|t| t.name == table.name) {
            self.tables.push(table);
        }
        self
    }

    /// Maximum number of pooled connections (default 4).
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_size = n.max(1);
        self
    }

    /// Parse the url, open the pool, and create missing tables.
    pub fn build(self) -> Result<Database> {
        let url = DatabaseUrl::parse(&self.url)?;

        let pool = Pool::builder()
            .max_size(self.max_size)
            .build(manager_for(&url))
            .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

        let db = Database {
            pool,
            url,
            tables: self.tables.into(),
        };
        db.create_all()?;

        tracing::info!(url = %db.url, tables = db.tables.len(), "database ready");
        Ok(db)
    }
}

fn manager_for(url: &DatabaseUrl) -> SqliteConnectionManager {
    let manager = match url.target() {
        Target::File(path) => SqliteConnectionManager::file(path),
        Target::Memory => {
            // Each pool gets its own shared-cache database so connections
            // within the pool see the same data and separate pools do not.
            use std::sync::atomic::{AtomicU64, Ordering};
            static COUNTER: AtomicU64 = AtomicU64::new(0);
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            SqliteConnectionManager::file(format!(
                "file:basemodel_mem_{n}?mode=memory&cache=shared"
            ))
        }
    };
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}
