use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod db;
mod models;
mod remote;
mod session;
mod sync;

use commands::{
    AuthCommand, ConfigCommand, ExerciseCommand, ReportCommand, SyncCommand, WellnessCommand,
};
use config::Config;
use db::{init_db, ExerciseRepository, WellnessRepository};
use session::SessionStore;

#[derive(Parser)]
#[command(name = "welltrack")]
#[command(version)]
#[command(about = "A wellness tracking CLI application", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage daily wellness entries
    Wellness(WellnessCommand),

    /// Manage exercise entries
    Exercise(ExerciseCommand),

    /// Show a trend report
    Report(ReportCommand),

    /// Manage the sync server session
    Auth(AuthCommand),

    /// Push unsynced entries to the sync server
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "welltrack=warn".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    let session = SessionStore::new(config.session_path.clone());

    match cli.command {
        Some(Commands::Wellness(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            let repo = WellnessRepository::new(pool);
            cmd.run(&repo, &session).await?;
        }
        Some(Commands::Exercise(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            let repo = ExerciseRepository::new(pool);
            cmd.run(&repo, &session).await?;
        }
        Some(Commands::Report(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            let wellness_repo = WellnessRepository::new(pool.clone());
            let exercise_repo = ExerciseRepository::new(pool);
            cmd.run(&wellness_repo, &exercise_repo, &session).await?;
        }
        Some(Commands::Auth(cmd)) => {
            cmd.run(&config, &session).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config, &session).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
