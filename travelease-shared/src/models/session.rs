use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, stable account identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Deterministic id for an email login: the same address always maps to
    /// the same account, regardless of case or surrounding whitespace.
    pub fn for_email(email: &str) -> Self {
        let normalized = email.trim().to_lowercase();
        Self(Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            format!("mailto:{}", normalized).as_bytes(),
        ))
    }

    /// Fresh time-ordered id for a newly registered account.
    pub fn fresh() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Durable representation of "who is signed in"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: SessionId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Display name used when none was given: the local part of the email.
    pub fn default_name(email: &str) -> &str {
        email.split('@').next().unwrap_or(email)
    }
}
