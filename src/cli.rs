use basemodel::migrate::DEFAULT_MESSAGE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "manage")]
#[command(author, version, about = "Database migration helper for basemodel projects")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database connection string (overrides the config file)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new migration revision from model changes
    Makemigrations {
        /// Revision message
        #[arg(short, long, default_value = DEFAULT_MESSAGE)]
        message: String,
    },

    /// Upgrade the database to the latest revision
    Migrate,

    /// Generate a revision, then upgrade
    Ezmigrate {
        /// Revision message
        #[arg(short, long, default_value = DEFAULT_MESSAGE)]
        message: String,
    },

    /// Point the migration tool's config file at the configured database
    #[command(name = "update_alembic_db_url", alias = "update-alembic-db-url")]
    UpdateAlembicDbUrl,

    /// Check that the migration tool is installed
    CheckTool,

    /// Print the effective configuration
    ShowConfig,
}
