//! Guard account flows for the guard portal client
//!
//! Login, registration, password reset and the guard profile. A successful
//! login writes the shared [`SessionStore`]; logout and a rejected token
//! clear it.

use guard_portal_resources::{paths, GuardProfile, ResourceClient, ResourceError, Society};
use guard_portal_session::{Session, SessionError, SessionStore};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by account flows
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Not logged in")]
    MissingSession,

    #[error("Request error: {0}")]
    Request(#[from] ResourceError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Text suitable for showing to the guard
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Request(err) => err.user_message(),
            AuthError::MissingSession => "Please log in to continue.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Email and password for `guard/guard-login`
#[derive(Debug, Clone, Default, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup form
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub society_id: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    society: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

fn required(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AuthError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Auth client for guard accounts
#[derive(Debug, Clone)]
pub struct AuthClient {
    resources: ResourceClient,
    session: SessionStore,
}

impl AuthClient {
    pub fn new(resources: ResourceClient, session: SessionStore) -> Self {
        Self { resources, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Log in and store the resulting session
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        required(&credentials.email, "Email")?;
        required(&credentials.password, "Password")?;

        let response: LoginResponse = self
            .resources
            .post(paths::GUARD_LOGIN, credentials, None)
            .await?;

        let email = response
            .email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| credentials.email.trim().to_string());
        let session = Session::new(response.token, email);
        self.session.set(session.clone())?;

        info!("Guard {} logged in", session.account_email);
        Ok(session)
    }

    /// Register a new guard account for a society
    pub async fn register(&self, form: &SignupForm) -> Result<String> {
        required(&form.email, "Email")?;
        required(&form.society_id, "Society")?;
        required(&form.password, "Password")?;
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let request = RegisterRequest {
            email: form.email.trim(),
            password: &form.password,
            society: &form.society_id,
        };
        let response: MessageResponse = self
            .resources
            .post(paths::GUARD_REGISTER, &request, None)
            .await?;

        Ok(response
            .message
            .unwrap_or_else(|| "Registration successful! Please log in.".to_string()))
    }

    /// Societies a guard can register for
    pub async fn societies(&self) -> Result<Vec<Society>> {
        match self.resources.fetch_list(paths::SOCIETIES, &[], None).await {
            Ok(societies) => Ok(societies),
            Err(ResourceError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Ask the backend to email a reset link
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        required(email, "Email")?;

        let response: MessageResponse = self
            .resources
            .post(
                paths::GUARD_FORGOT_PASSWORD,
                &serde_json::json!({ "email": email.trim() }),
                None,
            )
            .await?;

        Ok(response
            .message
            .unwrap_or_else(|| "Password reset link sent to your email.".to_string()))
    }

    /// Set a new password using the token from the reset link
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String> {
        required(token, "Reset token")?;
        required(new_password, "New password")?;
        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let request = ResetPasswordRequest {
            token,
            new_password,
        };
        let response: MessageResponse = self
            .resources
            .post(paths::GUARD_RESET_PASSWORD, &request, None)
            .await?;

        Ok(response
            .message
            .unwrap_or_else(|| "Password reset successful!".to_string()))
    }

    /// Profile of the signed-in guard
    ///
    /// A rejected token clears the session.
    pub async fn profile(&self) -> Result<GuardProfile> {
        let session = self.session.get().ok_or(AuthError::MissingSession)?;

        match self
            .resources
            .fetch_one(paths::GUARD_PROFILE, Some(session.token.as_str()), None)
            .await
        {
            Ok(profile) => Ok(profile),
            Err(ResourceError::Unauthorized) => {
                warn!("Profile request rejected, clearing session");
                self.logout()?;
                Err(ResourceError::Unauthorized.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Forget the current session
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Guard logged out");
        Ok(())
    }
}
