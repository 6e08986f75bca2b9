#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read snapshot '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write snapshot '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to encode snapshot '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed snapshot '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot writer for '{0}' has stopped")]
    WriterClosed(String),

    #[error("Storage misconfigured: {0}")]
    Config(String),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}
