//! eventbook server
//!
//! Serves the GraphQL API over HTTP, backed by MongoDB.
//!
//! Run with: cargo run --bin eventbook-server

use std::sync::Arc;

use eventbook::storage::MongoStorage;
use eventbook::{BookingService, Config, PasswordHasher, build_schema, router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!(database = %config.database.name, "Connecting to database...");
    let storage = MongoStorage::connect(&config.database.uri, &config.database.name).await?;
    storage.ping().await?;
    tracing::info!("Database connected!");

    let service = BookingService::new(
        Arc::new(storage),
        PasswordHasher::new(config.bcrypt_cost),
        config.max_traversal_depth,
    );
    let app = router(build_schema(service), config.graphiql);

    tracing::info!("GraphQL server listening on http://{}/graphql", config.listen_addr);
    if config.graphiql {
        tracing::info!("GraphiQL available at http://{}/", config.listen_addr);
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
