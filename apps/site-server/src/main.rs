//! # Meridian Site Server
//!
//! Backend for the Meridian Logistics marketing site: localized CMS
//! content, lead-generation forms and the CMS publish webhook.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use meridian_core::ports::SystemClock;
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod test_support;

use background::Scheduler;
use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Meridian site server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config, Arc::new(SystemClock)).await?;

    let mut scheduler = Scheduler::new(config.scheduler.clone()).await?;
    if scheduler.is_enabled() {
        background::register_sweeps(&scheduler, state.clone()).await?;
    }
    scheduler.start().await?;

    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    scheduler.shutdown().await?;
    Ok(())
}
