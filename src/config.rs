use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

/// Which `MemeRepository` implementation backs the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; all data is lost on restart.
    Memory,
    /// DynamoDB-backed persistent store.
    DynamoDb,
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    pub store_backend: StoreBackend,
    pub memes_table_name: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let bind_address_str =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let store_backend_str =
            env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".to_string());
        let store_backend = match store_backend_str.to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "dynamodb" => StoreBackend::DynamoDb,
            other => {
                return Err(ConfigError::InvalidVar(
                    "STORE_BACKEND".into(),
                    format!("expected 'memory' or 'dynamodb', got '{}'", other),
                ));
            }
        };

        let memes_table_name =
            env::var("MEMES_TABLE_NAME").unwrap_or_else(|_| "memes".to_string());

        let aws_region =
            env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "ca-central-1".to_string());

        // Allow overriding endpoint for localstack/testing
        let localstack_endpoint = env::var("AWS_ENDPOINT_URL").ok(); // Optional

        Ok(Config {
            bind_address,
            store_backend,
            memes_table_name,
            aws_region,
            localstack_endpoint,
        })
    }
}
