//! User domain types and validation rules.

use std::str::FromStr;

use leavedesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }
}

/// A login email, trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses a directory email. Only the shape is checked: one `@`, a local
    /// part, and a dotted domain that neither starts nor ends with a dot.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();
        match email_problem(&normalized) {
            Some(problem) => Err(AppError::Validation(format!(
                "invalid email '{normalized}': {problem}"
            ))),
            None => Ok(Self(normalized)),
        }
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn email_problem(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("empty");
    }
    if email.len() > 254 {
        return Some("longer than 254 characters");
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Some("must contain exactly one '@'");
    };
    if local.is_empty() {
        return Some("nothing before '@'");
    }
    let labels_ok =
        domain.split('.').count() > 1 && domain.split('.').all(|label| !label.is_empty());
    if !labels_ok {
        return Some("domain needs a dot between non-empty labels");
    }
    None
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Fewest characters a password may have.
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Most characters a password may have; caps hashing work per sign-in.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Passwords long enough to pass the length rule but known to be guessed first.
static COMMON_PASSWORDS: &[&str] = &[
    "0123456789",
    "1234567890",
    "1111111111",
    "qwertyuiop",
    "qwerty1234",
    "password12",
    "password123",
    "password1234",
    "letmein123",
    "welcome123",
    "changeme123",
    "admin12345",
    "holiday123",
    "vacation123",
    "leavedesk123",
];

/// Checks a new password against the length bounds and the common list.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    let problem = if length < PASSWORD_MIN_LENGTH {
        format!("password needs at least {PASSWORD_MIN_LENGTH} characters")
    } else if length > PASSWORD_MAX_LENGTH {
        format!("password may have at most {PASSWORD_MAX_LENGTH} characters")
    } else if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        "password is too common".to_owned()
    } else {
        return Ok(());
    };

    Err(AppError::Validation(problem))
}

#[cfg(test)]
mod tests {
    use super::{EmailAddress, UserId, validate_password};

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = EmailAddress::new("  Rui.Costa@Example.PT ")
            .unwrap_or_else(|error| panic!("valid email rejected: {error}"));
        assert_eq!(email.as_str(), "rui.costa@example.pt");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in [
            "",
            "no-at-sign.pt",
            "a@b@example.pt",
            "@example.pt",
            "rui@localhost",
            "rui@example.",
            "rui@.pt",
        ] {
            assert!(EmailAddress::new(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("Vacation123").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
        assert!(validate_password("a fortnight by the sea").is_ok());
    }

    #[test]
    fn user_id_round_trips_through_text() {
        let user_id = UserId::new();
        assert_eq!(user_id.to_string().parse::<UserId>().ok(), Some(user_id));
    }
}
