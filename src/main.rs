//! Gridmatch server entrypoint.

use anyhow::Result;
use clap::Parser;
use gridmatch::cli::{Cli, Command};
use gridmatch::{GameRepository, GameService, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            db_path,
        } => serve(host, port, db_path).await,
    }
}

/// Run the HTTP match server.
async fn serve(host: String, port: u16, db_path: String) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!(db_path = %db_path, "Starting gridmatch server");

    let repository = GameRepository::new(db_path)?;
    repository.run_migrations()?;

    let service = GameService::new(repository);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(host = %host, port, "Server ready");

    axum::serve(listener, app).await?;

    Ok(())
}
