use std::{env, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod aws_clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod models;
mod query;
mod repositories;
mod routes;
mod startup;

use crate::config::{Config, StoreBackend};
use crate::domain::MemeRepository;
use crate::errors::AppError;
use crate::repositories::{DynamoDbMemeRepository, InMemoryMemeRepository};

/// AppState holds shared resources for the web server.
#[derive(Clone)]
pub struct AppState {
    pub meme_repo: Arc<dyn MemeRepository>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "meme_archive=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(?config.store_backend, "Configuration loaded");

    // --- Store selection and bootstrap ---
    let meme_repo: Arc<dyn MemeRepository> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory meme store (data is lost on restart)");
            Arc::new(InMemoryMemeRepository::new())
        }
        StoreBackend::DynamoDb => {
            tracing::info!("Using DynamoDB meme store");
            let sdk_config = aws_clients::create_sdk_config(&config).await?;
            let db_client = aws_clients::create_dynamodb_client(&sdk_config);
            startup::create_memes_table_if_not_exists(&db_client, &config.memes_table_name)
                .await?;
            Arc::new(DynamoDbMemeRepository::new(
                db_client,
                config.memes_table_name.clone(),
            ))
        }
    };

    // Explicit, idempotent demo-data seeding during bootstrap
    startup::seed_store(meme_repo.as_ref()).await?;

    // --- Application State & Router ---
    let state = Arc::new(AppState { meme_repo });
    let app = routes::create_router(state);

    // --- Server Startup ---
    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
