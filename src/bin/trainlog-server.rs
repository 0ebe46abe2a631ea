// ABOUTME: Main server binary for the trainlog workout tracking backend
// ABOUTME: Loads configuration, opens the database, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trainlog server entry point

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use trainlog::auth::AuthManager;
use trainlog::config::environment::ServerConfig;
use trainlog::database::Database;
use trainlog::logging;
use trainlog::resources::ServerResources;
use trainlog::server::HttpServer;

#[derive(Parser)]
#[command(name = "trainlog-server")]
#[command(about = "Workout tracking backend with live set sequencing")]
struct Args {
    /// HTTP port override (defaults to HTTP_PORT or 8081)
    #[arg(long)]
    http_port: Option<u16>,

    /// Database URL override (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    tracing::info!("Starting trainlog server: {}", config.summary());

    let database = Database::new(&config.database.url).await?;
    tracing::info!("Database ready at {}", config.database.url);

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone().into_bytes(),
        config.auth.jwt_expiry_hours,
    );

    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));

    HttpServer::new(resources).serve().await?;
    Ok(())
}
