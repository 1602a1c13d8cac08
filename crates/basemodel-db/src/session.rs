//! Unit-of-work over one pooled connection.
//!
//! Writes open a transaction lazily and stay pending until [`Session::commit`].
//! Reads issued through the same session see its pending writes. Dropping a
//! session with an open transaction rolls it back.

use std::cell::Cell;

use basemodel_core::{Error, Result};
use chrono::Utc;
use rusqlite::types::{FromSql, Value};
use rusqlite::{params_from_iter, Connection, Row};

use crate::database::PooledConnection;
use crate::entity::{format_timestamp, Entity};
use crate::schema::quote_ident;

/// One unit of work. Not shareable between threads; take one per thread.
pub struct Session {
    conn: PooledConnection,
    in_transaction: Cell<bool>,
}

impl Session {
    pub(crate) fn new(conn: PooledConnection) -> Self {
        Self {
            conn,
            in_transaction: Cell::new(false),
        }
    }

    /// The underlying connection, for statements this crate does not cover.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether writes are pending.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    /// Open a transaction unless one is already open.
    pub fn begin(&self) -> Result<()> {
        if !self.in_transaction.get() {
            tracing::debug!("BEGIN");
            self.conn.execute_batch("BEGIN").map_err(Error::database)?;
            self.in_transaction.set(true);
        }
        Ok(())
    }

    /// Commit every pending write. A no-op when nothing is pending.
    pub fn commit(&self) -> Result<()> {
        if self.in_transaction.get() {
            tracing::debug!("COMMIT");
            self.conn.execute_batch("COMMIT").map_err(Error::database)?;
            self.in_transaction.set(false);
        }
        Ok(())
    }

    /// Discard every pending write.
    pub fn rollback(&self) -> Result<()> {
        if self.in_transaction.get() {
            tracing::debug!("ROLLBACK");
            self.in_transaction.set(false);
            self.conn.execute_batch("ROLLBACK").map_err(Error::database)?;
        }
        Ok(())
    }

    /// Run a write statement inside the session's transaction.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.begin()?;
        tracing::debug!(sql, params = params.len(), "execute");
        self.conn
            .execute(sql, params_from_iter(params))
            .map_err(Error::database)
    }

    /// Run a read statement and map every row.
    pub fn query_map<T, F>(&self, sql: &str, params: &[Value], f: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        tracing::debug!(sql, params = params.len(), "query");
        let mut stmt = self.conn.prepare(sql).map_err(Error::database)?;
        let rows = stmt
            .query_map(params_from_iter(params), f)
            .map_err(Error::database)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::database)?;
        Ok(rows)
    }

    /// Run a read statement returning a single value.
    pub fn query_scalar<T: FromSql>(&self, sql: &str, params: &[Value]) -> Result<T> {
        tracing::debug!(sql, params = params.len(), "query");
        self.conn
            .query_row(sql, params_from_iter(params), |row| row.get(0))
            .map_err(Error::database)
    }

    /// Write `entity` without committing.
    ///
    /// Unsaved entities are inserted, which assigns `id` and both timestamps.
    /// Saved entities have their columns and `updated_at` rewritten.
    pub fn save<E: Entity>(&self, entity: &mut E) -> Result<()> {
        match entity.meta().id {
            None => self.insert(entity),
            Some(id) => self.update(entity, id),
        }
    }

    /// Delete the row backing `entity` without committing.
    pub fn remove<E: Entity>(&self, entity: &E) -> Result<()> {
        let id = entity
            .meta()
            .id
            .ok_or_else(|| Error::not_persisted(E::TYPE_NAME))?;

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(&E::table_name()),
            quote_ident("id")
        );
        let n = self.execute(&sql, &[Value::Integer(id)])?;
        if n == 0 {
            return Err(Error::not_persisted(format!("{} {id}", E::TYPE_NAME)));
        }
        Ok(())
    }

    fn insert<E: Entity>(&self, entity: &mut E) -> Result<()> {
        let now = Utc::now();
        let stamp = Value::Text(format_timestamp(now));

        let mut columns = vec![quote_ident("created_at"), quote_ident("updated_at")];
        columns.extend(E::COLUMNS.iter().map(|c| quote_ident(c.name)));

        let mut params = vec![stamp.clone(), stamp];
        params.extend(entity.values()?);

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&E::table_name()),
            columns.join(", "),
            vec!["?"; params.len()].join(", ")
        );
        self.execute(&sql, &params)?;

        let meta = entity.meta_mut();
        meta.id = Some(self.conn.last_insert_rowid());
        meta.created_at = Some(now);
        meta.updated_at = Some(now);
        Ok(())
    }

    fn update<E: Entity>(&self, entity: &mut E, id: i64) -> Result<()> {
        let now = Utc::now();
        let updated_at = match entity.meta().created_at {
            Some(created) if created > now => created,
            _ => now,
        };

        let mut assignments = vec![format!("{} = ?", quote_ident("updated_at"))];
        assignments.extend(
            E::COLUMNS
                .iter()
                .map(|c| format!("{} = ?", quote_ident(c.name))),
        );

        let mut params = vec![Value::Text(format_timestamp(updated_at))];
        params.extend(entity.values()?);
        params.push(Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_ident(&E::table_name()),
            assignments.join(", "),
            quote_ident("id")
        );
        let n = self.execute(&sql, &params)?;
        if n == 0 {
            return Err(Error::not_persisted(format!("{} {id}", E::TYPE_NAME)));
        }

        entity.meta_mut().updated_at = Some(updated_at);
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.rollback() {
            tracing::warn!("Failed to roll back session on drop: {}", e);
        }
    }
}
