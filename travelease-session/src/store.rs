use std::sync::Arc;
use tracing::{debug, info, warn};
use travelease_core::{Credentials, IdentityProvider, Registration, SnapshotRepository};
use travelease_shared::{Masked, SessionRecord};
use travelease_store::{load_snapshot, SnapshotWriter};

use crate::AuthRejection;

/// Lifecycle of the current-user slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `initialize` has not finished yet
    Loading,
    SignedOut,
    SignedIn(SessionRecord),
}

/// Owns the signed-in identity and keeps it in its snapshot slot.
pub struct SessionStore {
    repo: Arc<dyn SnapshotRepository>,
    identity: Arc<dyn IdentityProvider>,
    writer: SnapshotWriter,
    state: SessionState,
}

impl SessionStore {
    /// Must be called from within a tokio runtime.
    pub fn new(
        repo: Arc<dyn SnapshotRepository>,
        identity: Arc<dyn IdentityProvider>,
        key: impl Into<String>,
    ) -> Self {
        let writer = SnapshotWriter::spawn(repo.clone(), key);
        Self {
            repo,
            identity,
            writer,
            state: SessionState::Loading,
        }
    }

    /// Restore the persisted session. Runs once; a missing or unreadable
    /// record leaves the store signed out.
    pub async fn initialize(&mut self) {
        if self.state != SessionState::Loading {
            debug!("Session store already initialized");
            return;
        }

        self.state = match load_snapshot::<SessionRecord>(self.repo.as_ref(), self.writer.key()).await {
            Ok(Some(record)) => {
                info!("Restored session for {}", record.email);
                SessionState::SignedIn(record)
            }
            Ok(None) => SessionState::SignedOut,
            Err(e) => {
                warn!("Ignoring stored session: {}", e);
                SessionState::SignedOut
            }
        };
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state != SessionState::Loading
    }

    pub fn current(&self) -> Option<&SessionRecord> {
        match &self.state {
            SessionState::SignedIn(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    pub async fn sign_in(
        &mut self,
        email: &str,
        password: impl Into<Masked<String>>,
    ) -> Result<SessionRecord, AuthRejection> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.into(),
        };

        let record = self
            .identity
            .sign_in(&credentials)
            .await
            .map_err(|e| AuthRejection::from_identity(e, AuthRejection::SignInFailed))?;

        self.establish(record, AuthRejection::SignInFailed).await
    }

    pub async fn sign_up(
        &mut self,
        name: &str,
        email: &str,
        password: impl Into<Masked<String>>,
    ) -> Result<SessionRecord, AuthRejection> {
        let registration = Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.into(),
        };

        let record = self
            .identity
            .sign_up(&registration)
            .await
            .map_err(|e| AuthRejection::from_identity(e, AuthRejection::SignUpFailed))?;

        self.establish(record, AuthRejection::SignUpFailed).await
    }

    /// Drop the session in memory and in storage. Never fails; a failed
    /// deletion is only logged.
    pub async fn sign_out(&mut self) {
        if let SessionState::SignedIn(record) = &self.state {
            info!("Signing out {}", record.email);
        }
        self.state = SessionState::SignedOut;

        self.writer.remove();
        if let Err(e) = self.writer.flush().await {
            warn!("Failed to remove stored session: {}", e);
        }
    }

    /// Flush pending writes and stop the writer.
    pub async fn teardown(self) {
        if let Err(e) = self.writer.shutdown().await {
            warn!("Session store closed with unsaved state: {}", e);
        }
    }

    // The in-memory session stays set even when the write fails.
    async fn establish(
        &mut self,
        record: SessionRecord,
        failure: AuthRejection,
    ) -> Result<SessionRecord, AuthRejection> {
        info!("Signed in as {} ({})", record.email, record.id);
        self.state = SessionState::SignedIn(record.clone());

        let persisted = match self.writer.save(&record) {
            Ok(_) => self.writer.flush().await,
            Err(e) => Err(e),
        };

        match persisted {
            Ok(()) => Ok(record),
            Err(e) => {
                warn!("Session for {} not persisted: {}", record.email, e);
                Err(failure)
            }
        }
    }
}
