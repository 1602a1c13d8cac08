//! Table definitions and idempotent schema creation.

use basemodel_core::{Error, Result};
use rusqlite::Connection;

use crate::column::Column;
use crate::entity::Entity;

/// Columns every entity table carries ahead of its own.
pub const META_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Quote an identifier for use in SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The storage shape of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub columns: &'static [Column],
}

impl TableDef {
    pub fn of<E: Entity>() -> Self {
        Self {
            name: E::table_name(),
            columns: E::COLUMNS,
        }
    }

    /// All column names: `id`, `created_at`, `updated_at`, then the entity's own.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        META_COLUMNS
            .iter()
            .copied()
            .chain(self.columns.iter().map(|c| c.name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names().any(|c| c == name)
    }

    /// Fail with [`Error::UnknownColumn`] unless `name` is a column of this table.
    pub fn check_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(Error::unknown_column(&self.name, name))
        }
    }

    /// Comma separated, quoted column list for `SELECT`.
    pub fn select_list(&self) -> String {
        self.column_names()
            .map(quote_ident)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn quoted_name(&self) -> String {
        quote_ident(&self.name)
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let mut defs = vec![
            format!("{} INTEGER PRIMARY KEY", quote_ident("id")),
            format!("{} TEXT NOT NULL", quote_ident("created_at")),
            format!("{} TEXT NOT NULL", quote_ident("updated_at")),
        ];
        defs.extend(self.columns.iter().map(Column::definition));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.quoted_name(),
            defs.join(",\n    ")
        )
    }
}

/// Create each table that does not exist yet. Existing tables are left as is.
pub fn create_all(conn: &Connection, tables: &[TableDef]) -> Result<()> {
    for table in tables {
        let existed = table_exists(conn, &table.name)?;
        conn.execute_batch(&table.create_sql())
            .map_err(Error::database)?;
        if !existed {
            tracing::info!(table = %table.name, "created table");
        }
    }
    Ok(())
}

/// Whether a table with this name exists.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )
    .map_err(Error::database)
}
