//! Types every LeaveDesk crate depends on: the error taxonomy, the session
//! identity and validated text.

#![forbid(unsafe_code)]

/// The identity kept in a signed-in session.
pub mod auth;
mod error;
mod text;

pub use auth::UserIdentity;
pub use error::{AppError, AppResult};
pub use text::NonEmptyString;
