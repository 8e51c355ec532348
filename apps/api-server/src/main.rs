//! # Sigil API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;


use config::AppConfig;
use middleware::recover::CatchPanic;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env()?;

    tracing::info!(
        "Starting Sigil API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;
    let store = state.store.clone();

    // Runs until SIGINT/SIGTERM, after in-flight requests drain
    HttpServer::new(move || {
        App::new()
            .wrap(CatchPanic)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(handlers::json_config())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("HTTP server stopped, closing credential store");
    store.shutdown().await?;

    Ok(())
}
