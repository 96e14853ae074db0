use clap::Parser;
use tracing_subscriber::EnvFilter;
use vidhub_api::cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. can live there.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vidhub_api=debug,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = vidhub_api::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}
