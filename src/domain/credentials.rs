use serde::{Deserialize, Serialize};
use std::fmt;

/// Email + password pair, re-sent with every authenticated request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// Keep passwords out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password() {
        let c = Credentials::new("a@b.com", "hunter2");
        let s = format!("{c:?}");
        assert!(s.contains("a@b.com"));
        assert!(!s.contains("hunter2"));
    }

    #[test]
    fn blank_fields_are_incomplete() {
        assert!(!Credentials::new(" ", "x").is_complete());
        assert!(!Credentials::new("a@b.com", "").is_complete());
        assert!(Credentials::new("a@b.com", "x").is_complete());
    }
}
