//! Column definitions and the Rust type to SQL type mapping.

use rusqlite::types::{FromSql, ToSql};

/// SQLite storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

/// A type-specific column declared by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub unique: bool,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType, nullable: bool) -> Self {
        Self {
            name,
            sql_type,
            nullable,
            unique: false,
        }
    }

    /// Mark the column `UNIQUE`.
    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Column definition as it appears inside `CREATE TABLE`.
    pub fn definition(&self) -> String {
        let mut def = format!(
            "{} {}",
            crate::schema::quote_ident(self.name),
            self.sql_type.as_sql()
        );
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if self.unique {
            def.push_str(" UNIQUE");
        }
        def
    }
}

/// Rust types usable as entity fields.
///
/// `Option<T>` maps to a nullable column of `T`'s storage class; every other
/// type maps to `NOT NULL`.
pub trait ColumnType: ToSql + FromSql {
    const SQL_TYPE: SqlType;
    const NULLABLE: bool = false;
}

macro_rules! column_type {
    ($sql:expr => $($t:ty),*) => {
        $(
            impl ColumnType for $t {
                const SQL_TYPE: SqlType = $sql;
            }
        )*
    };
}

column_type!(SqlType::Integer => bool, i8, i16, i32, i64, u8, u16, u32);
column_type!(SqlType::Real => f32, f64);
column_type!(SqlType::Text => String);
column_type!(SqlType::Blob => Vec<u8>);

impl<T: ColumnType> ColumnType for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;
    const NULLABLE: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_nullable() {
        assert!(!<String as ColumnType>::NULLABLE);
        assert!(<Option<String> as ColumnType>::NULLABLE);
        assert_eq!(<Option<i64> as ColumnType>::SQL_TYPE, SqlType::Integer);
    }

    #[test]
    fn definitions() {
        let name = Column::new("name", SqlType::Text, false);
        assert_eq!(name.definition(), r#""name" TEXT NOT NULL"#);

        let email = Column::new("email", SqlType::Text, true).unique();
        assert_eq!(email.definition(), r#""email" TEXT UNIQUE"#);
    }
}
