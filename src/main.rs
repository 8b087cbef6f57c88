use anyhow::Context;
use todo_lists_lib::db::{self, verify_migration, UserRepository};
use todo_lists_lib::{AppState, StorageConfig};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Todo Lists");

    let config = StorageConfig::from_env();
    tracing::info!("Data directory: {:?}", config.data_dir);

    let storage = db::prepare_storage(&config)
        .with_context(|| format!("Failed to prepare database at {:?}", config.db_path()))?;

    if storage.shape().is_normalized() {
        let warnings = storage
            .db()
            .with_connection(verify_migration)
            .context("Failed to verify migrated data")?;
        for warning in &warnings {
            tracing::warn!("Integrity check: {}", warning);
        }
    }

    let state = AppState::new(storage);

    let users = UserRepository::new(state.db.clone())
        .count()
        .context("Failed to read store summary")?;

    tracing::info!("Todo store ready ({:?} schema, {} users)", state.shape, users);

    state.db.close();
    Ok(())
}
