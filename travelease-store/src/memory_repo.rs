use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use travelease_core::SnapshotRepository;

/// Process-local snapshot storage. Nothing survives the process, but state
/// survives dropping and recreating the stores that share it.
#[derive(Default)]
pub struct MemorySnapshotRepository {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a slot, e.g. with data left behind by an earlier run
    pub fn with_entry(key: &str, payload: &str) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_string(), payload.to_string());
        Self {
            slots: RwLock::new(slots),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.slots.read().await.get(key).cloned()
    }
}

#[async_trait]
impl SnapshotRepository for MemorySnapshotRepository {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.get(key).await)
    }

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.slots.write().await.remove(key);
        Ok(())
    }
}
