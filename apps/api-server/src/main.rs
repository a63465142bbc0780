//! # Blog API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod sign_in;
mod state;
mod telemetry;
mod tls;

use config::AppConfig;
use middleware::cors::CorsMiddleware;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_telemetry(&TelemetryConfig::from_env());

    // Load configuration
    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    tracing::info!(
        "Starting Blog API Server on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(whitelisted = config.whitelist.len(), "Sign-in whitelist loaded");

    // Build application state
    let state = AppState::new(&config).await.map_err(std::io::Error::other)?;

    // Expired sessions and sign-in states are swept in the background
    #[cfg(feature = "scheduler")]
    let mut scheduler = {
        use background::{Scheduler, SchedulerConfig, register_purge_jobs};

        let scheduler = Scheduler::new(SchedulerConfig::from_env())
            .await
            .map_err(std::io::Error::other)?;
        register_purge_jobs(
            &scheduler,
            state.sessions.clone(),
            state.states.clone(),
            config.session_purge_interval,
            config.state_purge_interval,
        )
        .await
        .map_err(std::io::Error::other)?;
        scheduler.start().await.map_err(std::io::Error::other)?;
        scheduler
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(CorsMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    });

    let server = match &config.tls {
        Some(tls_config) => server.bind_rustls_0_23(
            (config.host.as_str(), config.port),
            tls::load_server_config(tls_config)?,
        )?,
        None => {
            tracing::warn!("TLS_CERT/TLS_KEY not set - serving plain HTTP");
            server.bind((config.host.as_str(), config.port))?
        }
    };

    server.run().await?;

    #[cfg(feature = "scheduler")]
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }

    Ok(())
}
