use serde::Deserialize;
use std::fmt;

/// A secret (password, card number, CVV) that must never show up in logs.
///
/// `Debug` and `Display` print a fixed mask. There is no
/// `Serialize` impl, so a secret cannot end up inside a persisted snapshot.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the real value. Callers are responsible for not logging it.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Masked<String> {
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl From<&str> for Masked<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_formatting() {
        let secret: Masked<String> = Masked::from("hunter2");
        assert_eq!(format!("{:?}", secret), "********");
        assert_eq!(secret.to_string(), "********");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Masked::<String>::from("   ").is_blank());
        assert!(!Masked::<String>::from("x").is_blank());
    }
}
