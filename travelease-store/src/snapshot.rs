use serde::de::DeserializeOwned;
use travelease_core::SnapshotRepository;

use crate::StoreError;

/// Read and decode a store snapshot. `Ok(None)` when the slot is empty.
pub async fn load_snapshot<T: DeserializeOwned>(
    repo: &dyn SnapshotRepository,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let payload = repo.load(key).await.map_err(|e| StoreError::Read {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    match payload {
        None => Ok(None),
        Some(payload) => serde_json::from_str(&payload)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            }),
    }
}
