mod cli;

use basemodel::config::{self, Config};
use basemodel::migrate::{self, Migrator};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "basemodel=debug,basemodel_db=debug,manage=debug".to_string()
        } else {
            "basemodel=info,basemodel_db=info,manage=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
        config::validate_config(&config)?;
    }

    match cli.command {
        Commands::Makemigrations { message } => {
            exit_code(Migrator::new(config.migrations).makemigrations(&message)?)
        }
        Commands::Migrate => exit_code(Migrator::new(config.migrations).migrate()?),
        Commands::Ezmigrate { message } => {
            exit_code(Migrator::new(config.migrations).ezmigrate(&message)?)
        }
        Commands::UpdateAlembicDbUrl => update_alembic_db_url(&config),
        Commands::CheckTool => check_tool(&config),
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(code: i32) -> Result<ExitCode> {
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

fn update_alembic_db_url(config: &Config) -> Result<ExitCode> {
    let path = &config.migrations.config_file;
    migrate::update_db_url(path, &config.database.url)
        .with_context(|| format!("Failed to update {}", path.display()))?;
    println!("Updated {} in {}", migrate::URL_KEY, path.display());
    Ok(ExitCode::SUCCESS)
}

fn check_tool(config: &Config) -> Result<ExitCode> {
    let tool = migrate::check_tool(&config.migrations.tool);

    let status = if tool.available { "✓" } else { "✗" };
    print!("{} {}", status, tool.name);
    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }
    println!();

    if tool.available {
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\n{} was not found in PATH.", tool.name);
        Ok(ExitCode::FAILURE)
    }
}
