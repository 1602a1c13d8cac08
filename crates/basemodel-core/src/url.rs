//! SQLite connection strings.
//!
//! Accepts the `sqlite://` form used by the migration tool's config file so a
//! single value can drive both the runtime pool and `alembic.ini`:
//!
//! | url                       | target                 |
//! |---------------------------|------------------------|
//! | `sqlite:///db.sqlite3`    | `db.sqlite3` (relative)|
//! | `sqlite:////var/app.db`   | `/var/app.db`          |
//! | `sqlite://`               | in-memory              |
//! | `sqlite:///:memory:`      | in-memory              |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

const SCHEME: &str = "sqlite://";

/// Where a [`DatabaseUrl`] points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A database file on disk.
    File(PathBuf),
    /// A private in-memory database.
    Memory,
}

/// A parsed `sqlite://` connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    raw: String,
    target: Target,
}

impl DatabaseUrl {
    /// Parse a connection string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for any scheme other than `sqlite://`
    /// or when a host part is present (`sqlite://host/db`).
    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix(SCHEME)
            .ok_or_else(|| Error::InvalidUrl(format!("{raw}: only sqlite:// urls are supported")))?;

        let target = match rest {
            "" | "/:memory:" => Target::Memory,
            _ => match rest.strip_prefix('/') {
                Some(path) if !path.is_empty() => Target::File(PathBuf::from(path)),
                _ => {
                    return Err(Error::InvalidUrl(format!(
                        "{raw}: expected sqlite:///<path>"
                    )))
                }
            },
        };

        Ok(Self {
            raw: raw.to_string(),
            target,
        })
    }

    /// The connection string as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Where the url points.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.target == Target::Memory
    }

    /// Path of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(p) => Some(p),
            Target::Memory => None,
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DatabaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for DatabaseUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for DatabaseUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
