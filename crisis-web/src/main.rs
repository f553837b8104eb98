//! HTTP entry point. Loads configuration, wires a `CrisisEngine`, and binds
//! the routes in §6's table over `actix-web`, in the teacher's bootstrap
//! shape (CORS for LAN/dev origins, `middleware::Logger`, explicit
//! `AddrInUse` diagnostic).

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use crisis_alerts::LoggingAlertDispatcher;
use crisis_config::EngineConfig;
use crisis_engine::CrisisEngine;
use crisis_web::{routes, AppState};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid configuration, falling back to defaults");
        EngineConfig::default()
    });

    let engine = Arc::new(CrisisEngine::new(config, Arc::new(LoggingAlertDispatcher)));
    let state = AppState { engine };
    let bind = crisis_common::service::CrisisWebBind::bind();

    tracing::info!("crisis-web online at http://{bind}");

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .allowed_origin_fn(|origin, _req| {
                let Ok(o) = origin.to_str() else {
                    return false;
                };
                o.starts_with("http://localhost:")
                    || o.starts_with("http://127.0.0.1:")
                    || o.starts_with("https://localhost:")
                    || o.starts_with("https://127.0.0.1:")
            })
            .supports_credentials();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(routes::configure)
    });

    let server = match server.bind(&bind) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            tracing::error!(%bind, error = %e, "bind failed: address already in use");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    server.run().await
}
