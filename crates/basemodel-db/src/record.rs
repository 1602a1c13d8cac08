//! Ordered column-name to value mapping returned by `Entity::to_dict`.

use rusqlite::types::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Column values of one entity, in column-declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing entry in place or appending.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object (blobs become arrays of bytes).
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

struct SqlValue<'a>(&'a Value);

impl Serialize for SqlValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => b.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, &SqlValue(v))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut r = Record::new();
        r.insert("id", Value::Integer(1));
        r.insert("name", Value::Text("a".into()));
        r.insert("count", Value::Null);
        assert_eq!(r.keys().collect::<Vec<_>>(), ["id", "name", "count"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut r = Record::new();
        r.insert("a", Value::Integer(1));
        r.insert("b", Value::Integer(2));
        r.insert("a", Value::Integer(3));
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("a"), Some(&Value::Integer(3)));
        assert_eq!(r.keys().next(), Some("a"));
    }

    #[test]
    fn json_rendering() {
        let mut r = Record::new();
        r.insert("id", Value::Integer(1));
        r.insert("name", Value::Text("a".into()));
        r.insert("note", Value::Null);
        assert_eq!(
            r.to_json().unwrap(),
            serde_json::json!({"id": 1, "name": "a", "note": null})
        );
    }
}
