use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Text that is non-blank after trimming. Holds the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims `value` and rejects it when nothing is left.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        match value.trim() {
            "" => Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            )),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    /// Like [`NonEmptyString::new`] but also caps the length in characters,
    /// naming `field` in either error.
    pub fn with_max_chars(
        field: &str,
        value: impl Into<String>,
        max_chars: usize,
    ) -> AppResult<Self> {
        let text = Self::new(value)
            .map_err(|_| AppError::Validation(format!("{field} must not be empty")))?;
        if text.0.chars().count() > max_chars {
            return Err(AppError::Validation(format!(
                "{field} must not exceed {max_chars} characters"
            )));
        }

        Ok(text)
    }

    /// Borrows the trimmed text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
