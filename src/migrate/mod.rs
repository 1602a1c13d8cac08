//! Thin wrappers around the external migration tool.

mod ini;
mod tool;

pub use ini::{rewrite_url_line, update_db_url, URL_KEY};
pub use tool::{check_tool, ToolInfo};

use crate::config::MigrationsConfig;
use basemodel_core::{Error, Result};
use std::process::Command;

/// Revision message used when none is given.
pub const DEFAULT_MESSAGE: &str = "automigration";

/// Runs an external program and reports its exit code.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<i32>;
}

/// Spawns the program directly with the parent's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        tracing::info!("Executing: {} {:?}", program, args);

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| Error::tool(program, format!("failed to execute: {e}")))?;

        match status.code() {
            Some(code) => {
                tracing::debug!("{} exited with {}", program, code);
                Ok(code)
            }
            None => {
                tracing::warn!("{} was terminated by a signal", program);
                Ok(1)
            }
        }
    }
}

/// Builds and runs migration tool invocations for one configuration.
pub struct Migrator<R = SystemRunner> {
    config: MigrationsConfig,
    runner: R,
}

impl Migrator<SystemRunner> {
    pub fn new(config: MigrationsConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> Migrator<R> {
    pub fn with_runner(config: MigrationsConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Generate a new revision by diffing models against the database.
    pub fn makemigrations(&self, message: &str) -> Result<i32> {
        self.invoke(&["revision", "--autogenerate", "-m", message])
    }

    /// Upgrade the database to the latest revision.
    pub fn migrate(&self) -> Result<i32> {
        self.invoke(&["upgrade", "head"])
    }

    /// `makemigrations` followed by `migrate`.
    ///
    /// Both steps always run. Returns the first non-zero exit code, or 0.
    pub fn ezmigrate(&self, message: &str) -> Result<i32> {
        let revision = self.makemigrations(message)?;
        if revision != 0 {
            tracing::warn!("Revision generation exited with {}", revision);
        }
        let upgrade = self.migrate()?;
        Ok(if revision != 0 { revision } else { upgrade })
    }

    fn invoke(&self, subcommand: &[&str]) -> Result<i32> {
        let mut args = vec![
            "-c".to_string(),
            self.config.config_file.to_string_lossy().into_owned(),
        ];
        args.extend(subcommand.iter().map(|s| s.to_string()));
        self.runner.run(&self.config.tool, &args)
    }
}
