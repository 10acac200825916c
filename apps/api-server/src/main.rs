//! # Quill API Server
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
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::init(&config).await?;

    #[cfg(feature = "rate-limit")]
    let limiter = std::sync::Arc::new(quill_infra::KeyedRateLimiter::new(
        config.rate_limit.clone(),
    ));

    #[cfg(feature = "scheduler")]
    let mut scheduler = if config.scheduler.enabled {
        let jobs = background::Maintenance {
            state: state.clone(),
            #[cfg(feature = "rate-limit")]
            limiter: limiter.clone(),
        };
        match background::start(config.scheduler.clone(), jobs).await {
            Ok(scheduler) => Some(scheduler),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start scheduler; continuing without it");
                None
            }
        }
    } else {
        tracing::info!("Scheduler disabled");
        None
    };

    let server_state = state.clone();
    HttpServer::new(move || {
        let app = App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(server_state.clone()));

        #[cfg(feature = "rate-limit")]
        let app = app.wrap(middleware::rate_limit::RateLimitMiddleware::new(
            limiter.clone(),
        ));

        app.configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }

    tracing::info!("Server stopped");
    Ok(())
}
