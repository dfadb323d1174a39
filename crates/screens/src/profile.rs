//! Guard profile screen

use crate::notice::Notice;
use crate::routes::Route;
use crate::state::{Effect, ScreenState};
use crate::ScreenContext;
use guard_portal_auth::AuthError;
use guard_portal_resources::{GuardProfile, ResourceError};
use log::{error, warn};

pub struct ProfileScreen {
    ctx: ScreenContext,
    state: ScreenState,
    profile: Option<GuardProfile>,
}

impl ProfileScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            state: ScreenState::Uninitialized,
            profile: None,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn profile(&self) -> Option<&GuardProfile> {
        self.profile.as_ref()
    }

    pub async fn load(&mut self) -> Effect {
        if !self.ctx.session().is_authenticated() {
            self.state = ScreenState::RedirectToLogin;
            return Effect::Navigate(Route::Login);
        }

        self.state = ScreenState::Loading;
        match self.ctx.auth.profile().await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.state = ScreenState::Ready;
                Effect::Stay
            }
            // The auth client already dropped the session
            Err(AuthError::Request(ResourceError::Unauthorized)) | Err(AuthError::MissingSession) => {
                self.ctx
                    .notify(Notice::error("Your session has expired. Please log in again."));
                self.state = ScreenState::RedirectToLogin;
                Effect::Navigate(Route::Login)
            }
            Err(err) => {
                error!("Error fetching guard profile: {}", err);
                let message = err.user_message();
                self.ctx.notify(Notice::error(message.clone()));
                self.state = ScreenState::Errored(message);
                Effect::Stay
            }
        }
    }

    pub fn logout(&mut self) -> Effect {
        if let Err(err) = self.ctx.auth.logout() {
            warn!("Failed to clear session: {}", err);
        }
        self.profile = None;
        self.state = ScreenState::RedirectToLogin;
        self.ctx.notify(Notice::info("Logged out"));
        Effect::Navigate(Route::Login)
    }
}
