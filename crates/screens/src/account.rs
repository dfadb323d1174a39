//! Login, signup and password reset forms

use crate::notice::Notice;
use crate::routes::Route;
use crate::state::{Effect, ScreenError};
use crate::ScreenContext;
use guard_portal_auth::{AuthError, Credentials, SignupForm};
use guard_portal_resources::Society;
use log::{error, warn};

fn auth_failed(ctx: &ScreenContext, what: &str, err: AuthError) -> ScreenError {
    error!("{} failed: {}", what, err);
    ctx.notify(Notice::error(err.user_message()));
    err.into()
}

pub struct LoginScreen {
    ctx: ScreenContext,
    pub credentials: Credentials,
    submitting: bool,
}

impl LoginScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            credentials: Credentials::default(),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Log in and go to the entry permission screen
    pub async fn submit(&mut self) -> Result<Effect, ScreenError> {
        self.submitting = true;
        let result = self.ctx.auth.login(&self.credentials).await;
        self.submitting = false;

        match result {
            Ok(_) => {
                self.credentials.password.clear();
                self.ctx.notify(Notice::success("Login successful!"));
                Ok(Effect::Navigate(Route::EntryPermission))
            }
            Err(err) => Err(auth_failed(&self.ctx, "Login", err)),
        }
    }
}

pub struct SignupScreen {
    ctx: ScreenContext,
    pub form: SignupForm,
    societies: Vec<Society>,
}

impl SignupScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            form: SignupForm::default(),
            societies: Vec::new(),
        }
    }

    /// Societies offered in the signup form
    pub fn societies(&self) -> &[Society] {
        &self.societies
    }

    pub async fn load(&mut self) {
        match self.ctx.auth.societies().await {
            Ok(societies) => self.societies = societies,
            Err(err) => {
                warn!("Error fetching societies: {}", err);
                self.ctx
                    .notify(Notice::warning("Failed to load societies information"));
            }
        }
    }

    /// Register the account and go to login
    pub async fn submit(&mut self) -> Result<Effect, ScreenError> {
        match self.ctx.auth.register(&self.form).await {
            Ok(message) => {
                self.ctx.notify(Notice::success(message));
                self.form = SignupForm::default();
                Ok(Effect::Navigate(Route::Login))
            }
            Err(err) => Err(auth_failed(&self.ctx, "Signup", err)),
        }
    }
}

pub struct ForgotPasswordScreen {
    ctx: ScreenContext,
    pub email: String,
}

impl ForgotPasswordScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            email: String::new(),
        }
    }

    /// Request a reset link; the guard stays on the form
    pub async fn submit(&mut self) -> Result<Effect, ScreenError> {
        match self.ctx.auth.forgot_password(&self.email).await {
            Ok(message) => {
                self.ctx.notify(Notice::success(message));
                Ok(Effect::Stay)
            }
            Err(err) => Err(auth_failed(&self.ctx, "Password reset request", err)),
        }
    }
}

pub struct ResetPasswordScreen {
    ctx: ScreenContext,
    token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordScreen {
    pub fn new(ctx: ScreenContext, token: impl Into<String>) -> Self {
        Self {
            ctx,
            token: token.into(),
            new_password: String::new(),
            confirm_password: String::new(),
        }
    }

    /// Screen for a `/reset-password/:token` route
    pub fn from_route(ctx: ScreenContext, route: &Route) -> Option<Self> {
        match route {
            Route::ResetPassword { token } => Some(Self::new(ctx, token.clone())),
            _ => None,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Set the new password and go to login
    pub async fn submit(&mut self) -> Result<Effect, ScreenError> {
        match self
            .ctx
            .auth
            .reset_password(&self.token, &self.new_password, &self.confirm_password)
            .await
        {
            Ok(message) => {
                self.ctx.notify(Notice::success(message));
                Ok(Effect::Navigate(Route::Login))
            }
            Err(err) => Err(auth_failed(&self.ctx, "Password reset", err)),
        }
    }
}
