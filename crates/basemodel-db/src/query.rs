//! Lazy queries scoped to one entity table.
//!
//! Building a [`Query`] runs nothing. Terminal methods (`all`, `first`,
//! `count`, `exists`, `delete`) borrow the query, so the same handle can be
//! executed again after the data changed.

use std::marker::PhantomData;

use basemodel_core::{Error, Result};
use rusqlite::types::Value;

use crate::criterion::Criterion;
use crate::entity::Entity;
use crate::schema::{quote_ident, TableDef};
use crate::session::Session;
use crate::value::IntoValue;

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// A restartable query over the rows of `E`.
pub struct Query<'s, E> {
    session: &'s Session,
    criteria: Vec<Criterion>,
    equals: Vec<(String, Value)>,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
    offset: Option<usize>,
    entity: PhantomData<fn() -> E>,
}

impl<'s, E: Entity> Query<'s, E> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            criteria: Vec::new(),
            equals: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            entity: PhantomData,
        }
    }

    /// Restrict by a predicate. Multiple filters are AND-ed.
    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Restrict to rows where `column` equals `value`.
    ///
    /// The column name is checked against the entity when the query runs.
    pub fn filter_by(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.equals.push((column.into(), value.into_value()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order.push((column.into(), order));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Every matching row, ordered by `id` unless `order_by` was given.
    pub fn all(&self) -> Result<Vec<E>> {
        let (sql, params) = self.select(self.limit)?;
        self.session.query_map(&sql, &params, E::from_row)
    }

    /// The first matching row, or `None`.
    pub fn first(&self) -> Result<Option<E>> {
        let (sql, params) = self.select(Some(1))?;
        let mut rows = self.session.query_map(&sql, &params, E::from_row)?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    pub fn count(&self) -> Result<usize> {
        let table = E::table();
        let (filter, mut params) = self.where_clause(&table)?;
        let window = self.window(self.limit, &mut params);
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT 1 FROM {}{filter}{window})",
            table.quoted_name()
        );
        let n: i64 = self.session.query_scalar(&sql, &params)?;
        usize::try_from(n).map_err(Error::database)
    }

    pub fn exists(&self) -> Result<bool> {
        let table = E::table();
        let (filter, params) = self.where_clause(&table)?;
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {}{filter})",
            table.quoted_name()
        );
        self.session.query_scalar(&sql, &params)
    }

    /// Delete every matching row inside the session's transaction.
    ///
    /// Ordering, limit and offset do not apply. Does not commit.
    pub fn delete(&self) -> Result<usize> {
        let table = E::table();
        let (filter, params) = self.where_clause(&table)?;
        let sql = format!("DELETE FROM {}{filter}", table.quoted_name());
        self.session.execute(&sql, &params)
    }

    /// The `SELECT` statement `all` would run.
    pub fn to_sql(&self) -> Result<String> {
        self.select(self.limit).map(|(sql, _)| sql)
    }

    fn select(&self, limit: Option<usize>) -> Result<(String, Vec<Value>)> {
        let table = E::table();
        let (filter, mut params) = self.where_clause(&table)?;

        let order = if self.order.is_empty() {
            format!("{} ASC", quote_ident("id"))
        } else {
            self.order
                .iter()
                .map(|(column, dir)| -> Result<String> {
                    table.check_column(column)?;
                    Ok(format!("{} {}", quote_ident(column), dir.as_sql()))
                })
                .collect::<Result<Vec<_>>>()?
                .join(", ")
        };
        let window = self.window(limit, &mut params);

        let sql = format!(
            "SELECT {} FROM {}{filter} ORDER BY {order}{window}",
            table.select_list(),
            table.quoted_name()
        );
        Ok((sql, params))
    }

    fn where_clause(&self, table: &TableDef) -> Result<(String, Vec<Value>)> {
        let mut parts = Vec::new();
        let mut params = Vec::new();

        for (column, value) in &self.equals {
            table.check_column(column)?;
            if *value == Value::Null {
                parts.push(format!("{} IS NULL", quote_ident(column)));
            } else {
                parts.push(format!("{} = ?", quote_ident(column)));
                params.push(value.clone());
            }
        }
        for criterion in &self.criteria {
            let (sql, values) = criterion.clone().into_parts();
            parts.push(format!("({sql})"));
            params.extend(values);
        }

        if parts.is_empty() {
            Ok((String::new(), params))
        } else {
            Ok((format!(" WHERE {}", parts.join(" AND ")), params))
        }
    }

    fn window(&self, limit: Option<usize>, params: &mut Vec<Value>) -> String {
        let to_int = |n: usize| Value::Integer(i64::try_from(n).unwrap_or(i64::MAX));
        match (limit, self.offset) {
            (None, None) => String::new(),
            (Some(l), None) => {
                params.push(to_int(l));
                " LIMIT ?".to_string()
            }
            (l, Some(o)) => {
                params.push(l.map(to_int).unwrap_or(Value::Integer(-1)));
                params.push(to_int(o));
                " LIMIT ? OFFSET ?".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::col;
    use crate::database::Database;

    crate::entity! {
        struct Note {
            title: String,
            rank: i64,
            tag: Option<String>,
        }
    }

    fn seeded() -> (Database, Session) {
        let db = Database::memory().register::<Note>().build().unwrap();
        let session = db.session().unwrap();
        for (title, rank, tag) in [("a", 3, Some("x")), ("b", 1, None), ("c", 2, Some("x"))] {
            Note {
                title: title.into(),
                rank,
                tag: tag.map(String::from),
                ..Default::default()
            }
            .add(&session)
            .unwrap();
        }
        session.commit().unwrap();
        (db, session)
    }

    fn titles(notes: Vec<Note>) -> Vec<String> {
        notes.into_iter().map(|n| n.title).collect()
    }

    #[test]
    fn default_order_is_id() {
        let (_db, session) = seeded();
        assert_eq!(titles(Note::all(&session).unwrap()), ["a", "b", "c"]);
    }

    #[test]
    fn order_limit_offset() {
        let (_db, session) = seeded();
        let q = Note::query(&session).order_by("rank", Order::Desc).limit(2);
        assert_eq!(titles(q.all().unwrap()), ["a", "c"]);

        let q = Note::query(&session).order_by("rank", Order::Asc).offset(1);
        assert_eq!(titles(q.all().unwrap()), ["c", "a"]);
    }

    #[test]
    fn filter_by_null_matches_missing_values() {
        let (_db, session) = seeded();
        let q = Note::filter_by(&session, [("tag", None::<String>)]);
        assert_eq!(titles(q.all().unwrap()), ["b"]);
    }

    #[test]
    fn filter_and_filter_by_combine() {
        let (_db, session) = seeded();
        let q = Note::filter(&session, [col("rank").ge(2)]).filter_by("tag", "x");
        assert_eq!(q.count().unwrap(), 2);
        assert!(q.exists().unwrap());
    }

    #[test]
    fn unknown_column_is_reported_at_run_time() {
        let (_db, session) = seeded();
        let q = Note::filter_by(&session, [("colour", "red")]);
        assert!(matches!(q.all().unwrap_err(), Error::UnknownColumn { .. }));

        let q = Note::query(&session).order_by("colour", Order::Asc);
        assert!(q.first().is_err());
    }

    #[test]
    fn query_is_restartable() {
        let (_db, session) = seeded();
        let q = Note::filter_by(&session, [("tag", "x")]);
        assert_eq!(q.count().unwrap(), 2);

        Note {
            title: "d".into(),
            rank: 0,
            tag: Some("x".into()),
            ..Default::default()
        }
        .create(&session)
        .unwrap();

        assert_eq!(q.count().unwrap(), 3);
        assert_eq!(q.all().unwrap().len(), 3);
    }

    #[test]
    fn count_respects_limit() {
        let (_db, session) = seeded();
        assert_eq!(Note::query(&session).limit(2).count().unwrap(), 2);
    }

    #[test]
    fn query_delete_does_not_commit() {
        let (_db, session) = seeded();
        let n = Note::filter_by(&session, [("tag", "x")]).delete().unwrap();
        assert_eq!(n, 2);
        assert!(session.in_transaction());
        session.rollback().unwrap();
        assert_eq!(Note::count(&session).unwrap(), 3);
    }

    #[test]
    fn to_sql_shape() {
        let (_db, session) = seeded();
        let sql = Note::filter_by(&session, [("title", "a")]).to_sql().unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id", "created_at", "updated_at", "title", "rank", "tag" FROM "note" WHERE "title" = ? ORDER BY "id" ASC"#
        );
    }
}
