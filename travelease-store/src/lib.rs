pub mod app_config;
pub mod error;
pub mod file_repo;
pub mod memory_repo;
pub mod redis_repo;
pub mod snapshot;
pub mod writer;

use std::sync::Arc;

use travelease_core::SnapshotRepository;
use tracing::info;

pub use app_config::{CheckoutConfig, Config, StorageBackend, StorageConfig};
pub use error::StoreError;
pub use file_repo::FileSnapshotRepository;
pub use memory_repo::MemorySnapshotRepository;
pub use redis_repo::RedisSnapshotRepository;
pub use snapshot::load_snapshot;
pub use writer::{SnapshotWriter, WriteStatus};

/// Build the persistence backend selected by configuration.
pub fn open_repository(config: &StorageConfig) -> Result<Arc<dyn SnapshotRepository>, StoreError> {
    let repo: Arc<dyn SnapshotRepository> = match config.backend {
        StorageBackend::Memory => Arc::new(MemorySnapshotRepository::new()),
        StorageBackend::File => Arc::new(FileSnapshotRepository::new(&config.data_dir)),
        StorageBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                StoreError::Config("storage.redis_url is required for the redis backend".to_string())
            })?;
            Arc::new(RedisSnapshotRepository::new(url)?)
        }
    };
    info!("Using {:?} snapshot storage", config.backend);
    Ok(repo)
}
