use async_trait::async_trait;

/// Durable key-value slot holding a store's serialized snapshot.
///
/// Each store owns exactly one key. Payloads are opaque strings (JSON in
/// practice); a missing key is `Ok(None)`, not an error.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    async fn save(
        &self,
        key: &str,
        payload: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Removing a key that does not exist succeeds.
    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
