//! The base entity: identity, timestamps, and session-scoped CRUD helpers.
//!
//! Concrete types usually come from the [`entity!`](crate::entity!) macro,
//! which writes the [`Entity`] impl from the field list. A hand-written impl
//! only has to provide the column list and the field accessors; every CRUD
//! operation is a provided method.

use std::fmt;
use std::io::{BufRead, Write};

use basemodel_core::naming::title_to_snake;
use basemodel_core::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::column::Column;
use crate::criterion::Criterion;
use crate::query::Query;
use crate::record::Record;
use crate::schema::TableDef;
use crate::session::Session;
use crate::value::IntoValue;

/// Identity and timestamps shared by every entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityMeta {
    /// Assigned by the database on insert.
    pub id: Option<i64>,
    /// Set once on insert.
    pub created_at: Option<DateTime<Utc>>,
    /// Set on insert and refreshed on every saved update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl EntityMeta {
    /// Read `id`, `created_at` and `updated_at` from a row by column name.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: Some(parse_timestamp(row, "created_at")?),
            updated_at: Some(parse_timestamp(row, "updated_at")?),
        })
    }
}

/// Fixed-width RFC 3339 text, so stored values sort in time order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let idx = row.as_ref().column_index(column)?;
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Outcome of [`Entity::delete_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAll {
    /// Rows were deleted and the session committed.
    Deleted(usize),
    /// The confirmation prompt was declined; nothing was touched.
    Aborted,
}

/// Formats an entity as `<TypeName id>`.
pub fn fmt_entity<E: Entity>(entity: &E, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match entity.meta().id {
        Some(id) => write!(f, "<{} {}>", E::TYPE_NAME, id),
        None => write!(f, "<{} None>", E::TYPE_NAME),
    }
}

/// A record type mapped to its own table.
///
/// The table name is always [`title_to_snake`] of [`Entity::TYPE_NAME`].
pub trait Entity: Sized {
    /// Rust type name, e.g. `"UserAccount"`.
    const TYPE_NAME: &'static str;

    /// Type-specific columns in declaration order.
    const COLUMNS: &'static [Column];

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Type-specific column values, in the order of [`Entity::COLUMNS`].
    fn values(&self) -> Result<Vec<Value>>;

    /// Assign one type-specific column.
    fn set_value(&mut self, column: &str, value: &Value) -> Result<()>;

    /// Hydrate from a row that selected every column by name.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn table_name() -> String {
        title_to_snake(Self::TYPE_NAME)
    }

    fn table() -> TableDef {
        TableDef::of::<Self>()
    }

    fn id(&self) -> Option<i64> {
        self.meta().id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.meta().created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.meta().updated_at
    }

    /// Every attribute, `id` and timestamps first, in declaration order.
    fn to_dict(&self) -> Result<Record> {
        let meta = self.meta();
        let mut record = Record::new();
        record.insert("id", meta.id.into_value());
        record.insert(
            "created_at",
            meta.created_at.map(format_timestamp).into_value(),
        );
        record.insert(
            "updated_at",
            meta.updated_at.map(format_timestamp).into_value(),
        );
        for (column, value) in Self::COLUMNS.iter().zip(self.values()?) {
            record.insert(column.name, value);
        }
        Ok(record)
    }

    /// Copy every column that is set on `other` onto `self`.
    ///
    /// A column is set when its value is not NULL, so `Some(0)` and `""` are
    /// copied while `None` leaves `self` untouched. Identity and timestamps
    /// are never copied. Nothing is written to storage.
    fn update(&mut self, other: &Self) -> Result<&mut Self> {
        for (column, value) in Self::COLUMNS.iter().zip(other.values()?) {
            if value != Value::Null {
                self.set_value(column.name, &value)?;
            }
        }
        Ok(self)
    }

    /// Write into the session's open transaction without committing.
    fn add(mut self, session: &Session) -> Result<Self> {
        session.save(&mut self)?;
        Ok(self)
    }

    /// Write and commit. On return `id` and both timestamps are set.
    fn create(self, session: &Session) -> Result<Self> {
        let entity = self.add(session)?;
        session.commit()?;
        Ok(entity)
    }

    fn query(session: &Session) -> Query<'_, Self> {
        Query::new(session)
    }

    fn filter(session: &Session, criteria: impl IntoIterator<Item = Criterion>) -> Query<'_, Self> {
        criteria
            .into_iter()
            .fold(Self::query(session), |q, c| q.filter(c))
    }

    /// Exact-match constraints on named columns.
    fn filter_by<K, V>(session: &Session, constraints: impl IntoIterator<Item = (K, V)>) -> Query<'_, Self>
    where
        K: Into<String>,
        V: IntoValue,
    {
        constraints
            .into_iter()
            .fold(Self::query(session), |q, (k, v)| q.filter_by(k, v))
    }

    fn all(session: &Session) -> Result<Vec<Self>> {
        Self::query(session).all()
    }

    /// First match by `id`, or `None`.
    fn get<K, V>(session: &Session, constraints: impl IntoIterator<Item = (K, V)>) -> Result<Option<Self>>
    where
        K: Into<String>,
        V: IntoValue,
    {
        Self::filter_by(session, constraints).first()
    }

    /// Delete the backing row and commit. Returns the now-detached value.
    fn delete(self, session: &Session) -> Result<Self> {
        session.remove(&self)?;
        session.commit()?;
        Ok(self)
    }

    /// Delete every row, asking on stdin first when `confirm` is set.
    fn delete_all(session: &Session, confirm: bool) -> Result<DeleteAll> {
        let stdin = std::io::stdin();
        Self::delete_all_with(session, confirm, stdin.lock(), std::io::stdout())
    }

    /// [`Entity::delete_all`] with the prompt wired to `input` / `output`.
    ///
    /// Only a reply of exactly `y` or `Y` proceeds; anything else prints `Aborting.`.
    fn delete_all_with<R: BufRead, W: Write>(
        session: &Session,
        confirm: bool,
        mut input: R,
        mut output: W,
    ) -> Result<DeleteAll> {
        if confirm {
            write!(
                output,
                "Are you sure you want to delete all {}? (y/N): ",
                Self::TYPE_NAME
            )?;
            output.flush()?;

            let mut reply = String::new();
            input.read_line(&mut reply)?;
            if !reply.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("y") {
                writeln!(output, "Aborting.")?;
                tracing::info!(table = %Self::table_name(), "delete_all aborted");
                return Ok(DeleteAll::Aborted);
            }
        }

        let deleted = Self::query(session).delete()?;
        session.commit()?;
        tracing::info!(table = %Self::table_name(), deleted, "deleted all rows");
        Ok(DeleteAll::Deleted(deleted))
    }

    fn exists(session: &Session, criteria: impl IntoIterator<Item = Criterion>) -> Result<bool> {
        Self::filter(session, criteria).exists()
    }

    fn count(session: &Session) -> Result<usize> {
        Self::query(session).count()
    }
}

/// Declare an entity struct and its [`Entity`] impl.
///
/// The struct gains a `meta: EntityMeta` field plus `Debug`, `Clone`,
/// `Default`, `PartialEq` and `Display` (`<Name id>`). Field types must
/// implement [`ColumnType`](crate::ColumnType).
///
/// ```
/// use basemodel_db::{entity, Entity};
///
/// entity! {
///     /// A registered account.
///     pub struct UserAccount {
///         pub email: String,
///         pub nickname: Option<String>,
///     }
/// }
///
/// assert_eq!(UserAccount::table_name(), "user_account");
/// let u = UserAccount { email: "a@b.c".into(), ..Default::default() };
/// assert_eq!(u.to_string(), "<UserAccount None>");
/// ```
#[macro_export]
macro_rules! entity {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fattr:meta])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            pub meta: $crate::EntityMeta,
            $(
                $(#[$fattr])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Entity for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            const COLUMNS: &'static [$crate::Column] = &[
                $(
                    $crate::Column::new(
                        stringify!($field),
                        <$ty as $crate::ColumnType>::SQL_TYPE,
                        <$ty as $crate::ColumnType>::NULLABLE,
                    ),
                )*
            ];

            fn meta(&self) -> &$crate::EntityMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut $crate::EntityMeta {
                &mut self.meta
            }

            fn values(&self) -> $crate::Result<::std::vec::Vec<$crate::Value>> {
                Ok(vec![$($crate::value::to_value(&self.$field)?),*])
            }

            #[allow(unused_variables)]
            fn set_value(&mut self, column: &str, value: &$crate::Value) -> $crate::Result<()> {
                match column {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::value::from_value(value)?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::Error::unknown_column(
                        <Self as $crate::Entity>::table_name(),
                        column,
                    )),
                }
            }

            fn from_row(row: &$crate::rusqlite::Row<'_>) -> $crate::rusqlite::Result<Self> {
                Ok(Self {
                    meta: $crate::EntityMeta::from_row(row)?,
                    $($field: row.get(stringify!($field))?,)*
                })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $crate::entity::fmt_entity(self, f)
            }
        }
    };
}
