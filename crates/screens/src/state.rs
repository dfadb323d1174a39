//! Screen state, effects and the errors a screen reports

use crate::routes::Route;
use guard_portal_auth::AuthError;
use guard_portal_resources::ResourceError;
use thiserror::Error;

/// Lifecycle of a data screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScreenState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    /// Loading failed; the message is what the guard was shown
    Errored(String),
    /// No usable session: the screen must not be shown
    RedirectToLogin,
}

impl ScreenState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ScreenState::Ready)
    }
}

/// What the caller should do after a screen operation
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Stay,
    Navigate(Route),
}

/// Local validation failures; these never reach the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Expiry date & time must be after the entry date & time")]
    ExpiryNotAfterEntry,

    #[error("No record with id {0}")]
    UnknownRecord(String),

    #[error("{0}")]
    NotAllowed(String),
}

/// Errors returned from screen operations
///
/// Every variant has already been shown to the guard as a notice.
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Yes/no gate in front of destructive actions
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Helper for required text fields
pub(crate) fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
