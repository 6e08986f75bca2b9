use travelease_core::CoreError;

/// Why a sign-in or sign-up was refused. `Display` is the message shown to
/// the user next to the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("{0}")]
    Invalid(String),

    #[error("Login failed")]
    SignInFailed,

    #[error("Signup failed")]
    SignUpFailed,
}

impl AuthRejection {
    pub(crate) fn from_identity(err: CoreError, fallback: AuthRejection) -> Self {
        match err {
            CoreError::ValidationError(reason) => AuthRejection::Invalid(reason),
            other => {
                tracing::warn!("Identity provider refused request: {}", other);
                fallback
            }
        }
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}
