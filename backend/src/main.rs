//! Backend entry-point: wires the dispatch pipeline and REST endpoints.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use mockable::DefaultClock;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use utoipa::OpenApi;

use backend::ApiDoc;
use backend::api::health::{HealthState, live, ready};
use backend::api::incidents;
use backend::outbound::memory::{MemoryStore, MemoryUnitOfWorkFactory};
use backend::server::config::ServerConfig;
use backend::server::{build_dispatcher, drain_on_shutdown};

async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = ServerConfig::parse();

    let subscriber = fmt().with_env_filter(EnvFilter::from_default_env());
    let init_result = if config.log_json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    if let Err(e) = init_result {
        warn!(error = %e, "tracing init failed");
    }

    let store = MemoryStore::new();
    let factory = Arc::new(MemoryUnitOfWorkFactory::new(store));
    let dispatcher = build_dispatcher(factory, Arc::new(DefaultClock))
        .map_err(|e| std::io::Error::other(format!("pipeline wiring failed: {e}")))?;
    let dispatcher = web::Data::new(dispatcher);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .app_data(server_health_state.clone())
            .service(incidents::create)
            .service(incidents::list)
            .service(incidents::get_by_id)
            .service(incidents::update)
            .service(incidents::remove)
            .service(incidents::add_comment)
            .service(ready)
            .service(live)
            .route("/api-doc/openapi.json", web::get().to(openapi_json))
    })
    .bind(config.bind_addr)?;

    // Liveness fails as soon as the shutdown signal arrives; actix's own
    // signal handling then stops the workers gracefully.
    let drain_state = health_state.clone();
    actix_web::rt::spawn(async move {
        drain_on_shutdown(actix_web::rt::signal::ctrl_c(), &drain_state).await;
    });

    health_state.mark_ready();
    server.run().await
}
