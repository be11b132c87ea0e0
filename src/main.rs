//! inventory-migrate: import a legacy local-storage export into the database.

use anyhow::{Context, Result};
use clap::Parser;
use inventory_lib::config::{AppConfig, DB_ENV_VAR};
use inventory_lib::domain::Category;
use inventory_lib::logging::init_logging;
use inventory_lib::migration::{migrate_from_file, MigrationResult};
use inventory_lib::init_db;
use std::path::PathBuf;
use std::process::ExitCode;

/// Migrate data from a legacy localStorage export (.json or .html) to the database
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to JSON or HTML file containing localStorage data
    file: PathBuf,

    /// Path to the SQLite database
    #[arg(long, env = DB_ENV_VAR)]
    db: Option<PathBuf>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = AppConfig::new(args.db, args.log_level);
    init_logging(&config.log_level).context("installing log subscriber")?;

    log::info!("DB path: {:?}", config.db_path);
    let pool = init_db(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;

    let result = migrate_from_file(&pool, &args.file);
    print_summary(&result);

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_summary(result: &MigrationResult) {
    if result.success {
        println!("Migration completed successfully!");
        for category in Category::all() {
            println!("{}: {}", category.label(), result.count(*category));
        }
        if !result.errors.is_empty() {
            println!("\nWarnings/Errors:");
            for error in &result.errors {
                println!("- {}", error);
            }
        }
    } else {
        println!("Migration failed!");
        println!(
            "Error: {}",
            result.error.as_deref().unwrap_or("Unknown error")
        );
        if !result.errors.is_empty() {
            println!("\nErrors:");
            for error in &result.errors {
                println!("- {}", error);
            }
        }
    }
}
