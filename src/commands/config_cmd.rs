use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

/// Inspect the resolved configuration
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the configuration after file and environment overrides
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(config)?);
                    Ok(())
                }
                OutputFormat::Text => {
                    println!("Config file:  {}", Config::default_config_path().display());
                    println!("Database:     {}", config.database_path.display());
                    println!("Session:      {}", config.session_path.display());
                    match config.sync.server_url.as_deref() {
                        Some(url) => println!("Sync server:  {}", url),
                        None => println!("Sync server:  not configured"),
                    }
                    println!("Sync period:  every {}h", config.sync.interval_hours);
                    Ok(())
                }
            },
        }
    }
}
