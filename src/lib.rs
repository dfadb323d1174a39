//! Guard Portal Rust Client Library
//!
//! A Rust client for the EntryKart security guard portal: guard accounts,
//! visitor entry permissions, daily service entries and the resident vehicle
//! register, backed by the portal's REST API.
//!
//! ```no_run
//! use guard_portal::prelude::*;
//!
//! # async fn run() -> Result<(), Error> {
//! let portal = GuardPortal::new("http://localhost:5000")?;
//! let mut entries = portal.entry_permission_screen();
//! if let Effect::Navigate(route) = entries.load().await {
//!     println!("go to {}", route);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

pub use guard_portal_auth as auth;
pub use guard_portal_resources as resources;
pub use guard_portal_screens as screens;
pub use guard_portal_session as session;

use crate::config::ClientOptions;
use crate::error::Result;
use guard_portal_auth::AuthClient;
use guard_portal_resources::{ResourceClient, RetryPolicy};
use guard_portal_screens::{
    EntryPermissionScreen, ExpiryWatch, ForgotPasswordScreen, LoginScreen, LogNotifier, Notifier,
    ProfileScreen, ResetPasswordScreen, Route, ScreenContext, ServiceEntryScreen, SignupScreen,
    VehicleScreen,
};
use guard_portal_session::{FileStorage, SessionStore};
use log::debug;
use reqwest::Client;
use std::sync::Arc;

/// The main entry point for the guard portal client
#[derive(Debug, Clone)]
pub struct GuardPortal {
    options: ClientOptions,
    resources: ResourceClient,
    context: ScreenContext,
}

impl GuardPortal {
    /// Create a client for the backend at `base_url` with default options
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_options(ClientOptions::default().with_base_url(base_url))
    }

    /// Create a client with custom options, logging notices
    pub fn new_with_options(options: ClientOptions) -> Result<Self> {
        Self::new_with_notifier(options, Arc::new(LogNotifier))
    }

    /// Create a client whose screens report notices to `notifier`
    pub fn new_with_notifier(options: ClientOptions, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let retry = RetryPolicy::new(options.max_retries, options.retry_delay);
        let resources =
            ResourceClient::new(&options.base_url, http_client.clone())?.with_retry_policy(retry);
        let auth_resources = match &options.auth_url {
            Some(url) => ResourceClient::new(url, http_client)?.with_retry_policy(retry),
            None => resources.clone(),
        };

        let session = match &options.session_path {
            Some(path) => {
                debug!("Persisting session to {}", path.display());
                SessionStore::new(FileStorage::new(path))
            }
            None => SessionStore::in_memory(),
        };

        let auth = AuthClient::new(auth_resources, session);
        let context = ScreenContext::new(resources.clone(), auth, notifier)
            .with_search_debounce(options.search_debounce);

        Ok(Self {
            options,
            resources,
            context,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Account flows: login, signup, password reset, profile
    pub fn auth(&self) -> &AuthClient {
        &self.context.auth
    }

    /// The shared session store
    pub fn session(&self) -> &SessionStore {
        self.context.session()
    }

    /// Raw access to the backend collections
    pub fn resources(&self) -> &ResourceClient {
        &self.resources
    }

    /// Context shared by every screen
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// The route shown for `path`, redirecting to login without a session
    pub fn resolve_route(&self, path: &str) -> Route {
        Route::resolve(path, self.session())
    }

    pub fn login_screen(&self) -> LoginScreen {
        LoginScreen::new(self.context.clone())
    }

    pub fn signup_screen(&self) -> SignupScreen {
        SignupScreen::new(self.context.clone())
    }

    pub fn forgot_password_screen(&self) -> ForgotPasswordScreen {
        ForgotPasswordScreen::new(self.context.clone())
    }

    pub fn reset_password_screen(&self, token: &str) -> ResetPasswordScreen {
        ResetPasswordScreen::new(self.context.clone(), token)
    }

    pub fn profile_screen(&self) -> ProfileScreen {
        ProfileScreen::new(self.context.clone())
    }

    pub fn entry_permission_screen(&self) -> EntryPermissionScreen {
        EntryPermissionScreen::new(self.context.clone())
    }

    pub fn service_entry_screen(&self) -> ServiceEntryScreen {
        ServiceEntryScreen::new(self.context.clone())
    }

    pub fn vehicle_screen(&self) -> VehicleScreen {
        VehicleScreen::new(self.context.clone())
    }

    /// Start polling for expiring permissions at the configured interval
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch_expiring(&self) -> ExpiryWatch {
        ExpiryWatch::spawn(self.context.clone(), self.options.expiry_poll_interval)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::GuardPortal;
    pub use guard_portal_auth::{Credentials, SignupForm};
    pub use guard_portal_resources::{EntryStatus, VehicleType};
    pub use guard_portal_screens::{ConfirmGate, Effect, Notice, NoticeQueue, Route, ScreenState};
    pub use guard_portal_session::Session;
}
