use async_trait::async_trait;
use redis::AsyncCommands;
use travelease_core::SnapshotRepository;
use tracing::debug;

/// Snapshot slots stored as plain Redis string keys
#[derive(Clone)]
pub struct RedisSnapshotRepository {
    client: redis::Client,
}

impl RedisSnapshotRepository {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SnapshotRepository for RedisSnapshotRepository {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(key).await?;
        Ok(payload)
    }

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, payload).await?;
        debug!("Snapshot written to redis key {}", key);
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
