use std::fmt;

use serde::{Deserialize, Serialize};

/// The signed-in user as remembered by the session store.
///
/// Only the subject is trusted for authorization; roles and the active flag
/// are re-read from the directory on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    email: String,
    name: String,
}

impl UserIdentity {
    /// Builds the identity for a directory user id.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            email: email.into().to_lowercase(),
            name: name.into(),
        }
    }

    /// User id in string form. Recorded as the subject of audit events.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Lowercased login email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display name at sign-in time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} <{}>", self.name, self.email)
    }
}
