//! Screen controllers for the guard portal
//!
//! Each screen binds a resource collection to local view state:
//!
//! - [`EntryPermissionScreen`] visitor entry permissions, with the
//!   society → flat → resident email dependent fields
//! - [`ServiceEntryScreen`] daily service visitors with check-in/check-out
//! - [`VehicleScreen`] resident vehicles with debounced server-side search
//! - [`ProfileScreen`] and the account forms in [`account`]
//!
//! Screens never panic on backend failures. Errors become screen state,
//! [`Notice`]s and typed results; navigation is returned as an [`Effect`]
//! for the caller to perform.

pub mod account;
pub mod debounce;
pub mod entries;
pub mod expiry;
pub mod lifecycle;
pub mod list;
pub mod notice;
pub mod profile;
pub mod routes;
pub mod search;
pub mod service_entries;
pub mod state;
pub mod vehicles;

pub use account::{ForgotPasswordScreen, LoginScreen, ResetPasswordScreen, SignupScreen};
pub use debounce::{Debounce, SearchTicket};
pub use entries::{EntryDraft, EntryPermissionScreen, EntryPermissions};
pub use expiry::{check_expiring, ExpiryWatch};
pub use lifecycle::{Lifecycle, UnmountHandle};
pub use list::{ListScreen, ScreenResource};
pub use notice::{LogNotifier, Notice, NoticeLevel, NoticeQueue, Notifier};
pub use profile::ProfileScreen;
pub use routes::Route;
pub use service_entries::{ServiceDraft, ServiceEntries, ServiceEntryScreen};
pub use state::{ConfirmGate, Effect, ScreenError, ScreenState, ValidationError};
pub use vehicles::{VehicleDraft, VehicleScreen, Vehicles};

use guard_portal_auth::AuthClient;
use guard_portal_resources::ResourceClient;
use guard_portal_session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Default delay between the last keystroke and a server-side search
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Everything a screen needs, injected rather than read from globals
#[derive(Clone)]
pub struct ScreenContext {
    pub resources: ResourceClient,
    pub auth: AuthClient,
    pub notifier: Arc<dyn Notifier>,
    pub search_debounce: Duration,
}

impl std::fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenContext")
            .field("resources", &self.resources)
            .field("session", self.auth.session())
            .field("search_debounce", &self.search_debounce)
            .finish()
    }
}

impl ScreenContext {
    pub fn new(resources: ResourceClient, auth: AuthClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            resources,
            auth,
            notifier,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }

    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    /// The shared session store
    pub fn session(&self) -> &SessionStore {
        self.auth.session()
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}
