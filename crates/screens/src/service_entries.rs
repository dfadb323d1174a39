//! Daily service visitors (maids, drivers, deliveries) and their check-ins

use crate::list::{ListScreen, ScreenResource};
use crate::notice::Notice;
use crate::state::{required, Effect, ScreenError, ValidationError};
use crate::ScreenContext;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use guard_portal_resources::{
    paths, EntryStatus, ResourceError, ServiceEntry, ServiceEntryPayload, Society, StatusUpdate,
};
use guard_portal_session::Session;
use log::{info, warn};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDraft {
    pub name: String,
    pub phone_number: String,
    pub society_id: Option<String>,
    pub visitor_type: String,
    pub description: String,
    /// `data:` URL of the visitor's photo
    pub photo: Option<String>,
    pub status: EntryStatus,
}

/// The `service-entries` collection
pub struct ServiceEntries;

impl ScreenResource for ServiceEntries {
    type Record = ServiceEntry;
    type Draft = ServiceDraft;
    type Payload = ServiceEntryPayload;

    const PATH: &'static str = paths::SERVICE_ENTRIES;
    const NOUN: &'static str = "Service entry";

    fn list_query(session: &Session) -> Vec<(&'static str, String)> {
        vec![("adminEmail", session.account_email.clone())]
    }

    fn search_fields(record: &ServiceEntry) -> Vec<&str> {
        vec![record.name.as_str(), record.visitor_type.as_str(), record.status.as_str()]
    }

    fn draft_from(record: &ServiceEntry) -> ServiceDraft {
        ServiceDraft {
            name: record.name.clone(),
            phone_number: record.phone_number.clone(),
            society_id: record.society_id.as_ref().map(|s| s.id().to_string()),
            visitor_type: record.visitor_type.clone(),
            description: record.description.clone().unwrap_or_default(),
            photo: record.photo.clone(),
            status: record.status,
        }
    }

    fn payload(draft: &ServiceDraft, session: &Session) -> Result<ServiceEntryPayload, ValidationError> {
        required(&draft.name, "Name")?;
        required(&draft.phone_number, "Phone number")?;
        let society_id = draft
            .society_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::MissingField("Society"))?;
        required(&draft.visitor_type, "Visitor type")?;

        Ok(ServiceEntryPayload {
            name: draft.name.trim().to_string(),
            phone_number: draft.phone_number.trim().to_string(),
            society_id: society_id.to_string(),
            visitor_type: draft.visitor_type.clone(),
            description: draft.description.trim().to_string(),
            photo: draft.photo.clone(),
            admin_email: session.account_email.clone(),
            status: draft.status,
        })
    }
}

/// Service entry list and form, plus check-in/check-out actions
pub struct ServiceEntryScreen {
    list: ListScreen<ServiceEntries>,
    societies: Vec<Society>,
}

impl Deref for ServiceEntryScreen {
    type Target = ListScreen<ServiceEntries>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl DerefMut for ServiceEntryScreen {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.list
    }
}

impl ServiceEntryScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            list: ListScreen::new(ctx),
            societies: Vec::new(),
        }
    }

    /// Load service entries and the societies offered by the form
    pub async fn load(&mut self) -> Effect {
        let effect = self.list.load().await;
        if effect != Effect::Stay || !self.list.state().is_ready() {
            return effect;
        }

        let Some(session) = self.list.context().session().get() else {
            return self.list.redirect_to_login();
        };
        let ctx = self.list.context().clone();
        let result = ctx
            .resources
            .fetch_list_cancellable::<Society>(
                paths::SOCIETIES,
                &[("email", session.account_email.as_str())],
                Some(session.token.as_str()),
                self.list.lifecycle().cancel_flag(),
            )
            .await;

        if !self.list.is_mounted() {
            return Effect::Stay;
        }
        match result {
            Ok(societies) => self.societies = societies,
            Err(ResourceError::Unauthorized) => return self.list.expire_session(),
            Err(ResourceError::NotFound) | Err(ResourceError::Cancelled) => {}
            Err(err) => {
                warn!("Error fetching societies: {}", err);
                ctx.notify(Notice::warning("Failed to load societies information"));
            }
        }
        Effect::Stay
    }

    pub fn societies(&self) -> &[Society] {
        &self.societies
    }

    pub fn select_society(&mut self, society_id: Option<&str>) -> Result<(), ValidationError> {
        if let Some(id) = society_id {
            if !self.societies.iter().any(|s| s.id == id) {
                return Err(ValidationError::UnknownRecord(id.to_string()));
            }
        }
        self.list.draft_mut().society_id = society_id.map(str::to_string);
        Ok(())
    }

    /// Store `bytes` as the draft's photo, encoded as a `data:` URL
    pub fn attach_photo(&mut self, bytes: &[u8], mime: &str) -> Result<(), ValidationError> {
        if !mime.starts_with("image/") {
            return Err(ValidationError::NotAllowed(format!(
                "Unsupported photo type: {}",
                mime
            )));
        }
        let encoded = STANDARD.encode(bytes);
        self.list.draft_mut().photo = Some(format!("data:{};base64,{}", mime, encoded));
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        self.list.draft_mut().photo = None;
    }

    /// Mark a pending visitor as arrived
    pub async fn check_in(&mut self, id: &str) -> Result<Effect, ScreenError> {
        self.transition(id, EntryStatus::CheckedIn).await
    }

    /// Mark a checked-in visitor as gone
    pub async fn check_out(&mut self, id: &str) -> Result<Effect, ScreenError> {
        self.transition(id, EntryStatus::CheckedOut).await
    }

    async fn transition(&mut self, id: &str, next: EntryStatus) -> Result<Effect, ScreenError> {
        let current = self
            .list
            .record(id)
            .map(|entry| entry.status)
            .ok_or_else(|| ValidationError::UnknownRecord(id.to_string()))
            .map_err(|err| self.list.invalid(err))?;

        let allowed = match next {
            EntryStatus::CheckedIn => {
                !matches!(current, EntryStatus::CheckedIn | EntryStatus::CheckedOut)
            }
            EntryStatus::CheckedOut => current == EntryStatus::CheckedIn,
            _ => false,
        };
        if !allowed {
            let err = ValidationError::NotAllowed(format!(
                "Cannot change status from {} to {}",
                current, next
            ));
            return Err(self.list.invalid(err));
        }

        let Some(session) = self.list.context().session().get() else {
            return Ok(self.list.redirect_to_login());
        };
        let ctx = self.list.context().clone();
        let result: Result<Value, ResourceError> = ctx
            .resources
            .update(
                paths::SERVICE_ENTRIES,
                id,
                &StatusUpdate { status: next },
                Some(session.token.as_str()),
            )
            .await;

        match result {
            Ok(_) => {
                info!("Service entry {} is now {}", id, next);
                let message = match next {
                    EntryStatus::CheckedIn => "Checked in successfully!",
                    _ => "Checked out successfully!",
                };
                ctx.notify(Notice::success(message));
                Ok(self.list.refresh(&session).await)
            }
            Err(err) => self.list.mutation_failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_requires_society() {
        let session = Session::new("tok", "guard@example.com");
        let draft = ServiceDraft {
            name: "Ravi".to_string(),
            phone_number: "9800000000".to_string(),
            visitor_type: "Maid".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ServiceEntries::payload(&draft, &session),
            Err(ValidationError::MissingField("Society"))
        );

        let draft = ServiceDraft {
            society_id: Some("soc-1".to_string()),
            ..draft
        };
        let payload = ServiceEntries::payload(&draft, &session).unwrap();
        assert_eq!(payload.admin_email, "guard@example.com");
        assert_eq!(payload.status, EntryStatus::Pending);
    }
}
