pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "vidhub")]
#[command(about = "VidHub API - video sharing backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store regardless of DATABASE_URL")]
        in_memory: bool,
    },

    #[command(about = "Create the database tables and indexes")]
    Migrate,

    #[command(about = "Create an admin account")]
    CreateAdmin {
        #[arg(help = "Username for the new admin")]
        username: String,
        #[arg(help = "Password for the new admin")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { port, in_memory } => commands::serve::handle(config, port, in_memory).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateAdmin { username, password } => {
            commands::admin::handle(config, &username, &password, output_format).await
        }
    }
}
