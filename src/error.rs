//! Error handling for the guard portal client

use guard_portal_auth::AuthError;
use guard_portal_resources::ResourceError;
use guard_portal_screens::ScreenError;
use guard_portal_session::SessionError;
use std::fmt;
use thiserror::Error;

/// Unified error type for the guard portal client
#[derive(Error, Debug)]
pub enum Error {
    /// Session persistence errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Backend request errors
    #[error("Request error: {0}")]
    Resource(#[from] ResourceError),

    /// Account flow errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Screen operation errors
    #[error("Screen error: {0}")]
    Screen(#[from] ScreenError),

    /// HTTP client setup errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Text suitable for showing to the guard
    pub fn user_message(&self) -> String {
        match self {
            Error::Resource(err) => err.user_message(),
            Error::Auth(err) => err.user_message(),
            Error::Screen(ScreenError::Resource(err)) => err.user_message(),
            Error::Screen(ScreenError::Auth(err)) => err.user_message(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
