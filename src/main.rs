mod config;
mod domain;
mod error;
mod infra;
mod middleware;
mod routes;
mod security;
mod state;
mod store;
#[cfg(test)]
mod testutil;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use infra::checkout::StripeCheckout;
use security::jwt::JwtVerifier;
use state::AppState;
use store::mongo::MongoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let db = infra::db::connect(&config.db_name).await?;
    let store = Arc::new(MongoStore::new(&db));
    let jwt = JwtVerifier::new(config.jwt_secret.clone());
    let checkout = Arc::new(StripeCheckout::new(
        config.stripe_secret_key.clone(),
        config.site_domain.clone(),
    )?);
    let state = AppState::new(store, jwt, checkout);

    let app = routes::router(state)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
