//! Generic list-and-form screen controller

use crate::lifecycle::{Lifecycle, UnmountHandle};
use crate::notice::Notice;
use crate::routes::Route;
use crate::search;
use crate::state::{ConfirmGate, Effect, ScreenError, ScreenState, ValidationError};
use crate::ScreenContext;
use guard_portal_resources::{Record, ResourceError};
use guard_portal_session::Session;
use log::{debug, error, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Describes one backend collection shown as a list plus an edit form
pub trait ScreenResource {
    type Record: Record + Clone + DeserializeOwned;
    type Draft: Default + Clone;
    type Payload: Serialize;

    /// Resource path, e.g. `entries`
    const PATH: &'static str;

    /// Singular noun used in notices, e.g. `Entry`
    const NOUN: &'static str;

    /// Query parameters for the list request
    fn list_query(session: &Session) -> Vec<(&'static str, String)>;

    /// Fields the local search looks at
    fn search_fields(record: &Self::Record) -> Vec<&str>;

    /// Form contents for editing `record`
    fn draft_from(record: &Self::Record) -> Self::Draft;

    /// Validate `draft` and build the request body
    fn payload(draft: &Self::Draft, session: &Session) -> Result<Self::Payload, ValidationError>;
}

/// State of one list screen: last fetched records, form draft and search term
pub struct ListScreen<R: ScreenResource> {
    ctx: ScreenContext,
    lifecycle: Lifecycle,
    state: ScreenState,
    records: Vec<R::Record>,
    draft: R::Draft,
    editing: Option<String>,
    search_term: String,
    saving: bool,
}

impl<R: ScreenResource> ListScreen<R> {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            lifecycle: Lifecycle::new(),
            state: ScreenState::Uninitialized,
            records: Vec::new(),
            draft: R::Draft::default(),
            editing: None,
            search_term: String::new(),
            saving: false,
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// True while the list request is in flight
    pub fn is_loading(&self) -> bool {
        self.state == ScreenState::Loading
    }

    /// True while a create/update is in flight
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Every record from the last fetch
    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&R::Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    /// Id of the record being edited, if the form is in update mode
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Records matching the current search term
    pub fn visible(&self) -> Vec<&R::Record> {
        self.records
            .iter()
            .filter(|record| search::matches(&self.search_term, &R::search_fields(record)))
            .collect()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    pub fn unmount_handle(&self) -> UnmountHandle {
        self.lifecycle.unmount_handle()
    }

    /// Load the list, or redirect when there is no session
    pub async fn load(&mut self) -> Effect {
        match self.ctx.session().get() {
            Some(session) => self.refresh(&session).await,
            None => self.redirect_to_login(),
        }
    }

    /// Put `id` into the form for editing
    pub fn begin_edit(&mut self, id: &str) -> Result<(), ValidationError> {
        let record = self
            .record(id)
            .ok_or_else(|| ValidationError::UnknownRecord(id.to_string()))?;
        self.draft = R::draft_from(record);
        self.editing = Some(id.to_string());
        Ok(())
    }

    /// Leave update mode and clear the form
    pub fn cancel_edit(&mut self) {
        self.reset_draft();
    }

    pub fn reset_draft(&mut self) {
        self.draft = R::Draft::default();
        self.editing = None;
    }

    /// Validate the draft, create or update it, then reload the list
    pub async fn submit(&mut self) -> Result<Effect, ScreenError> {
        let Some(session) = self.ctx.session().get() else {
            return Ok(self.redirect_to_login());
        };

        let payload = R::payload(&self.draft, &session).map_err(|err| self.invalid(err))?;

        self.saving = true;
        let editing = self.editing.clone();
        let result: Result<Value, ResourceError> = match &editing {
            Some(id) => {
                self.ctx
                    .resources
                    .update(R::PATH, id, &payload, Some(session.token.as_str()))
                    .await
            }
            None => {
                self.ctx
                    .resources
                    .create(R::PATH, &payload, Some(session.token.as_str()))
                    .await
            }
        };
        self.saving = false;

        match result {
            Ok(_) => {
                let verb = if editing.is_some() { "updated" } else { "added" };
                self.ctx
                    .notify(Notice::success(format!("{} {} successfully!", R::NOUN, verb)));
                self.reset_draft();
                Ok(self.refresh(&session).await)
            }
            Err(err) => self.mutation_failed(err),
        }
    }

    /// Delete `id` once `gate` confirms, then reload the list
    pub async fn remove(&mut self, id: &str, gate: &impl ConfirmGate) -> Result<Effect, ScreenError> {
        let prompt = format!(
            "Are you sure you want to delete this {}?",
            R::NOUN.to_lowercase()
        );
        if !gate.confirm(&prompt) {
            debug!("Delete of {} {} not confirmed", R::NOUN, id);
            return Ok(Effect::Stay);
        }

        let Some(session) = self.ctx.session().get() else {
            return Ok(self.redirect_to_login());
        };

        match self
            .ctx
            .resources
            .delete(R::PATH, id, Some(session.token.as_str()))
            .await
        {
            // 404: someone else deleted it first
            Ok(()) | Err(ResourceError::NotFound) => {
                self.records.retain(|record| record.id() != id);
                if self.editing.as_deref() == Some(id) {
                    self.reset_draft();
                }
                self.ctx
                    .notify(Notice::success(format!("{} deleted successfully!", R::NOUN)));
                Ok(self.refresh(&session).await)
            }
            Err(err) => self.mutation_failed(err),
        }
    }

    /// Refetch the list with `session`
    pub(crate) async fn refresh(&mut self, session: &Session) -> Effect {
        self.state = ScreenState::Loading;

        let query = R::list_query(session);
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let result = self
            .ctx
            .resources
            .fetch_list_cancellable(R::PATH, &pairs, Some(session.token.as_str()), self.lifecycle.cancel_flag())
            .await;

        self.apply_list(result)
    }

    /// Apply a list result unless the screen went away in the meantime
    pub(crate) fn apply_list(&mut self, result: Result<Vec<R::Record>, ResourceError>) -> Effect {
        if !self.is_mounted() {
            debug!("{} screen unmounted, dropping list result", R::NOUN);
            return Effect::Stay;
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.state = ScreenState::Ready;
                Effect::Stay
            }
            Err(ResourceError::NotFound) => {
                self.records.clear();
                self.state = ScreenState::Ready;
                Effect::Stay
            }
            Err(err) => self.load_failed(err),
        }
    }

    pub(crate) fn load_failed(&mut self, err: ResourceError) -> Effect {
        match err {
            ResourceError::Cancelled => Effect::Stay,
            ResourceError::Unauthorized | ResourceError::MissingToken => self.expire_session(),
            err => {
                error!("Error fetching {} list: {}", R::PATH, err);
                let message = err.user_message();
                self.ctx.notify(Notice::error(message.clone()));
                self.state = ScreenState::Errored(message);
                Effect::Stay
            }
        }
    }

    pub(crate) fn mutation_failed(&mut self, err: ResourceError) -> Result<Effect, ScreenError> {
        if err.is_unauthorized() {
            return Ok(self.expire_session());
        }
        error!("Error saving {}: {}", R::NOUN.to_lowercase(), err);
        self.ctx.notify(Notice::error(err.user_message()));
        Err(err.into())
    }

    pub(crate) fn invalid(&self, err: ValidationError) -> ScreenError {
        self.ctx.notify(Notice::error(err.to_string()));
        err.into()
    }

    /// The token was rejected: forget the session and leave the screen
    pub(crate) fn expire_session(&mut self) -> Effect {
        if let Err(err) = self.ctx.session().clear() {
            warn!("Failed to clear session: {}", err);
        }
        self.ctx
            .notify(Notice::error("Your session has expired. Please log in again."));
        self.redirect_to_login()
    }

    pub(crate) fn redirect_to_login(&mut self) -> Effect {
        self.state = ScreenState::RedirectToLogin;
        Effect::Navigate(Route::Login)
    }

    pub(crate) fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}
