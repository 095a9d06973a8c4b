//! Todo Server binary.

use task_store::{MemoryTaskStore, dynamodb::DynamoDbTaskStore, mongo::MongoTaskStore};
use todo_server::{
    config::{Config, StoreBackend},
    init_tracing, serve,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        store_backend = %config.store_backend,
        update_policy = %config.update_policy,
        environment = config.environment.as_deref().unwrap_or("unset"),
        "Starting Todo Server"
    );

    // Create task store and start server
    let update_policy = config.update_policy;
    match config.store_backend {
        StoreBackend::Memory => {
            let store = MemoryTaskStore::new().with_update_policy(update_policy);
            serve(config, store).await
        }
        StoreBackend::DynamoDb => {
            let store = DynamoDbTaskStore::connect(config.dynamodb_config())
                .await
                .with_update_policy(update_policy);
            serve(config, store).await
        }
        StoreBackend::MongoDb => {
            let store = MongoTaskStore::connect(config.mongo_config())
                .await?
                .with_update_policy(update_policy);
            serve(config, store).await
        }
    }
}
