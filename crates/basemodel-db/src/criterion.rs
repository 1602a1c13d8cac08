//! Predicate builder for `filter` and `exists`.
//!
//! Values are always bound as `?` parameters, never spliced into SQL text.
//!
//! ```
//! use basemodel_db::col;
//!
//! let c = col("name").eq("a").or(col("weight").gt(2.5));
//! assert_eq!(c.sql(), r#"("name" = ?) OR ("weight" > ?)"#);
//! assert_eq!(c.params().len(), 2);
//! ```

use std::ops::Not;

use rusqlite::types::Value;

use crate::schema::quote_ident;
use crate::value::IntoValue;

/// A boolean SQL expression with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    sql: String,
    params: Vec<Value>,
}

impl Criterion {
    /// An arbitrary SQL expression with `?` placeholders.
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn and(self, other: Criterion) -> Self {
        self.join("AND", other)
    }

    pub fn or(self, other: Criterion) -> Self {
        self.join("OR", other)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    fn join(mut self, op: &str, other: Criterion) -> Self {
        self.params.extend(other.params);
        Self {
            sql: format!("({}) {op} ({})", self.sql, other.sql),
            params: self.params,
        }
    }
}

impl Not for Criterion {
    type Output = Criterion;

    fn not(self) -> Criterion {
        Criterion {
            sql: format!("NOT ({})", self.sql),
            params: self.params,
        }
    }
}

/// Start a predicate on a column.
pub fn col(name: &str) -> Col {
    Col {
        ident: quote_ident(name),
    }
}

/// A column reference inside a predicate.
#[derive(Debug, Clone)]
pub struct Col {
    ident: String,
}

impl Col {
    fn compare(self, op: &str, value: impl IntoValue) -> Criterion {
        Criterion {
            sql: format!("{} {op} ?", self.ident),
            params: vec![value.into_value()],
        }
    }

    pub fn eq(self, value: impl IntoValue) -> Criterion {
        self.compare("=", value)
    }

    pub fn ne(self, value: impl IntoValue) -> Criterion {
        self.compare("<>", value)
    }

    pub fn lt(self, value: impl IntoValue) -> Criterion {
        self.compare("<", value)
    }

    pub fn le(self, value: impl IntoValue) -> Criterion {
        self.compare("<=", value)
    }

    pub fn gt(self, value: impl IntoValue) -> Criterion {
        self.compare(">", value)
    }

    pub fn ge(self, value: impl IntoValue) -> Criterion {
        self.compare(">=", value)
    }

    pub fn like(self, pattern: impl IntoValue) -> Criterion {
        self.compare("LIKE", pattern)
    }

    pub fn is_null(self) -> Criterion {
        Criterion::raw(format!("{} IS NULL", self.ident), Vec::new())
    }

    pub fn is_not_null(self) -> Criterion {
        Criterion::raw(format!("{} IS NOT NULL", self.ident), Vec::new())
    }

    /// `column IN (...)`. An empty list matches nothing.
    pub fn in_list<V: IntoValue>(self, values: impl IntoIterator<Item = V>) -> Criterion {
        let params: Vec<Value> = values.into_iter().map(IntoValue::into_value).collect();
        if params.is_empty() {
            return Criterion::raw("0", Vec::new());
        }
        let placeholders = vec!["?"; params.len()].join(", ");
        Criterion {
            sql: format!("{} IN ({placeholders})", self.ident),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_binds_value() {
        let c = col("name").eq("a");
        assert_eq!(c.sql(), r#""name" = ?"#);
        assert_eq!(c.params(), &[Value::Text("a".into())]);
    }

    #[test]
    fn combinators_keep_param_order() {
        let c = col("a").gt(1).and(col("b").lt(2)).or(col("c").ne(3));
        assert_eq!(c.sql(), r#"(("a" > ?) AND ("b" < ?)) OR ("c" <> ?)"#);
        assert_eq!(
            c.params(),
            &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn negation() {
        let c = !col("deleted").is_null();
        assert_eq!(c.sql(), r#"NOT ("deleted" IS NULL)"#);
        assert!(c.params().is_empty());
    }

    #[test]
    fn in_list() {
        let c = col("id").in_list([1, 2, 3]);
        assert_eq!(c.sql(), r#""id" IN (?, ?, ?)"#);
        assert_eq!(c.params().len(), 3);

        let empty = col("id").in_list(Vec::<i64>::new());
        assert_eq!(empty.sql(), "0");
    }

    #[test]
    fn raw_expression() {
        let c = Criterion::raw("length(name) > ?", vec![Value::Integer(3)]);
        assert_eq!(c.sql(), "length(name) > ?");
    }
}
