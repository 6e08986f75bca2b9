use async_trait::async_trait;
use serde::Deserialize;
use travelease_shared::{Masked, SessionId, SessionRecord};

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: Masked<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an existing account from its login credentials
    async fn sign_in(&self, credentials: &Credentials) -> CoreResult<SessionRecord>;

    /// Register a new account
    async fn sign_up(&self, registration: &Registration) -> CoreResult<SessionRecord>;
}

/// Accepts any non-empty email. Passwords are not checked.
pub struct MockIdentityProvider;

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> CoreResult<SessionRecord> {
        let email = credentials.email.trim();
        if email.is_empty() {
            return Err(CoreError::ValidationError("Email is required".to_string()));
        }

        tracing::info!("Mock sign-in for {}", email);

        Ok(SessionRecord::new(
            SessionId::for_email(email),
            email,
            SessionRecord::default_name(email),
        ))
    }

    async fn sign_up(&self, registration: &Registration) -> CoreResult<SessionRecord> {
        let email = registration.email.trim();
        let name = registration.name.trim();
        if email.is_empty() {
            return Err(CoreError::ValidationError("Email is required".to_string()));
        }
        if name.is_empty() {
            return Err(CoreError::ValidationError("Name is required".to_string()));
        }

        tracing::info!("Mock sign-up for {}", email);

        Ok(SessionRecord::new(SessionId::fresh(), email, name))
    }
}
