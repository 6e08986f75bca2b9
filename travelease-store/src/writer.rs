use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use travelease_core::SnapshotRepository;

use crate::StoreError;

#[derive(Debug, Clone)]
enum SnapshotOp {
    Save(String),
    Remove,
}

#[derive(Debug, Clone, Default)]
struct Pending {
    version: u64,
    op: Option<SnapshotOp>,
}

/// Outcome of the most recent write attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStatus {
    /// Version of the snapshot that was written; 0 before the first write
    pub version: u64,
    pub error: Option<String>,
}

/// Background writer owning all persistence I/O for one snapshot key.
///
/// Submitting never blocks. One write is in flight at a time; snapshots
/// submitted meanwhile collapse into the newest one, so the slot always ends
/// up holding the latest state and writes never land out of order.
pub struct SnapshotWriter {
    key: String,
    pending: watch::Sender<Pending>,
    status: watch::Receiver<WriteStatus>,
    submitted: AtomicU64,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Start the writer task. Must be called from within a tokio runtime.
    pub fn spawn(repo: Arc<dyn SnapshotRepository>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (pending, pending_rx) = watch::channel(Pending::default());
        let (status_tx, status) = watch::channel(WriteStatus::default());
        let task = tokio::spawn(run(repo, key.clone(), pending_rx, status_tx));

        Self {
            key,
            pending,
            status,
            submitted: AtomicU64::new(0),
            task,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue a full snapshot for writing. Returns its version.
    pub fn save<T: Serialize + ?Sized>(&self, snapshot: &T) -> Result<u64, StoreError> {
        let payload = serde_json::to_string(snapshot).map_err(|source| StoreError::Encode {
            key: self.key.clone(),
            source,
        })?;
        Ok(self.submit(SnapshotOp::Save(payload)))
    }

    /// Queue removal of the slot. Returns its version.
    pub fn remove(&self) -> u64 {
        self.submit(SnapshotOp::Remove)
    }

    fn submit(&self, op: SnapshotOp) -> u64 {
        let version = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.send_replace(Pending {
            version,
            op: Some(op),
        });
        version
    }

    pub fn last_status(&self) -> WriteStatus {
        self.status.borrow().clone()
    }

    /// Wait until everything submitted so far has been written, and report
    /// how that write went.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let target = self.submitted.load(Ordering::SeqCst);
        if target == 0 {
            return Ok(());
        }

        let mut status = self.status.clone();
        let reached: WriteStatus = status
            .wait_for(|s| s.version >= target)
            .await
            .map_err(|_| StoreError::WriterClosed(self.key.clone()))?
            .clone();

        match reached.error {
            None => Ok(()),
            Some(reason) => Err(StoreError::Write {
                key: self.key.clone(),
                reason,
            }),
        }
    }

    /// Flush, then stop the task.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        let flushed = self.flush().await;

        let Self { key, pending, task, .. } = self;
        drop(pending);
        if let Err(e) = task.await {
            error!("Snapshot writer for {} ended abnormally: {}", key, e);
        }

        flushed
    }
}

async fn run(
    repo: Arc<dyn SnapshotRepository>,
    key: String,
    mut pending: watch::Receiver<Pending>,
    status: watch::Sender<WriteStatus>,
) {
    while pending.changed().await.is_ok() {
        let (version, op) = {
            let latest = pending.borrow_and_update();
            (latest.version, latest.op.clone())
        };
        let Some(op) = op else { continue };

        let result = match &op {
            SnapshotOp::Save(payload) => repo.save(&key, payload).await,
            SnapshotOp::Remove => repo.remove(&key).await,
        };

        let error = match result {
            Ok(()) => {
                debug!("Persisted {} (version {})", key, version);
                None
            }
            Err(e) => {
                warn!("Failed to persist {} (version {}): {}", key, version, e);
                Some(e.to_string())
            }
        };

        status.send_replace(WriteStatus { version, error });
    }

    debug!("Snapshot writer for {} stopped", key);
}
