//! Order-status chatbot service
//!
//! An axum HTTP service that answers questions about orders loaded from a
//! CSV snapshot. Intent is resolved either by a deterministic pattern
//! matcher or, when `OPENAI_API_KEY` is set, by OpenAI function calling.

mod api;
mod chat;
mod conversation;
mod intent;
mod orders;

use api::{create_router, AppState};
use intent::ResolverConfig;
use orders::OrderStore;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orderbot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("ORDERBOT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let csv_path =
        std::env::var("ORDERBOT_ORDERS_CSV").unwrap_or_else(|_| "orders.csv".to_string());

    // Load the order snapshot; a bad snapshot is fatal.
    tracing::info!(path = %csv_path, "Loading order snapshot");
    let orders = OrderStore::load(&csv_path)?;
    tracing::info!(orders = orders.len(), "Order store ready");

    // Pick the intent resolution strategy once, at startup.
    let resolver = ResolverConfig::from_env().build();
    tracing::info!(strategy = resolver.name(), "Intent resolver selected");

    let state = AppState::new(orders, resolver);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
