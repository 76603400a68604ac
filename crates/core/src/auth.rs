use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Already-authenticated user handed over by the token verification layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: Uuid,
    display_name: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from verified token claims.
    #[must_use]
    pub fn new(subject: Uuid, display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            subject,
            display_name: display_name.into(),
            email,
        }
    }

    /// Returns the user record identifier carried by the token.
    #[must_use]
    pub fn subject(&self) -> Uuid {
        self.subject
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the token carried one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
