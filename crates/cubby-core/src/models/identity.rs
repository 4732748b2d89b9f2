use serde::{Deserialize, Serialize};

/// Authenticated user identity from the external auth backend.
///
/// The email is the stable reference for the user and doubles as the storage
/// namespace prefix: every object the user owns lives under `{email}/...`.
/// An `Identity` exists for the duration of one authenticated session; it is
/// created on sign-in (or session restoration) and destroyed on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: Some(display_name.into()),
        }
    }

    /// Display label: the display name when present, otherwise the email.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// Storage namespace prefix owned by this identity.
    pub fn prefix(&self) -> &str {
        &self.email
    }
}
