use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub migrations: MigrationsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Connection string shared by the runtime pool and the migration tool
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

fn default_url() -> String {
    "sqlite:///db.sqlite3".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrationsConfig {
    /// Migration tool executable, looked up in PATH unless it is a path
    #[serde(default = "default_tool")]
    pub tool: String,

    /// The tool's own configuration file (holds the `sqlalchemy.url` line)
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            config_file: default_config_file(),
        }
    }
}

fn default_tool() -> String {
    "alembic".to_string()
}

fn default_config_file() -> PathBuf {
    PathBuf::from("alembic.ini")
}
