mod types;

pub use types::*;

use anyhow::{Context, Result};
use basemodel_core::DatabaseUrl;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./manage.toml", "~/.config/basemodel/manage.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    DatabaseUrl::parse(&config.database.url)
        .with_context(|| "Invalid [database] url".to_string())?;

    if config.migrations.tool.trim().is_empty() {
        anyhow::bail!("[migrations] tool cannot be empty");
    }

    if config.migrations.config_file.as_os_str().is_empty() {
        anyhow::bail!("[migrations] config_file cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.database.url, "sqlite:///db.sqlite3");
        assert_eq!(config.migrations.tool, "alembic");
        assert_eq!(config.migrations.config_file, PathBuf::from("alembic.ini"));
        validate_config(&config).unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[database]
url = "sqlite:///data/app.db"
"#,
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite:///data/app.db");
        assert_eq!(config.migrations.tool, "alembic");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manage.toml");
        std::fs::write(
            &path,
            r#"
[migrations]
tool = "/opt/venv/bin/alembic"
config_file = "db/alembic.ini"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.migrations.tool, "/opt/venv/bin/alembic");
        assert_eq!(
            config.migrations.config_file,
            PathBuf::from("db/alembic.ini")
        );
    }

    #[test]
    fn rejects_bad_url() {
        let mut config = Config::default();
        config.database.url = "postgres://localhost/app".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_tool() {
        let mut config = Config::default();
        config.migrations.tool = "  ".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/manage.toml")));
        assert!(err.is_err());
    }
}
