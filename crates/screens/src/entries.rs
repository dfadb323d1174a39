//! Entry permission screen

use crate::expiry;
use crate::list::{ListScreen, ScreenResource};
use crate::notice::Notice;
use crate::state::{required, Effect, ValidationError};
use crate::ScreenContext;
use chrono::{Duration, NaiveDateTime};
use guard_portal_resources::{
    paths, EntryPermission, EntryPermissionPayload, EntryStatus, GuardProfile, Resident,
    ResourceError, Society, SocietyRef,
};
use guard_portal_session::Session;
use log::warn;
use std::ops::{Deref, DerefMut};

/// Days after the entry time at which a permission lapses
pub const PERMISSION_VALIDITY_DAYS: i64 = 7;

/// Form state of an entry permission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub name: String,
    pub society_id: Option<String>,
    pub flat_number: String,
    pub email: String,
    pub visitor_type: String,
    pub status: EntryStatus,
    pub date_time: Option<NaiveDateTime>,
    pub description: String,
    pub expiry_date_time: Option<NaiveDateTime>,
}

/// The `entries` collection
pub struct EntryPermissions;

impl ScreenResource for EntryPermissions {
    type Record = EntryPermission;
    type Draft = EntryDraft;
    type Payload = EntryPermissionPayload;

    const PATH: &'static str = paths::ENTRIES;
    const NOUN: &'static str = "Entry";

    fn list_query(session: &Session) -> Vec<(&'static str, String)> {
        vec![("email", session.account_email.clone())]
    }

    fn search_fields(record: &EntryPermission) -> Vec<&str> {
        vec![
            record.name.as_str(),
            record.status.as_str(),
            record.visitor_type.as_str(),
            record.flat_number.as_str(),
        ]
    }

    fn draft_from(record: &EntryPermission) -> EntryDraft {
        EntryDraft {
            name: record.name.clone(),
            society_id: record.society_id.as_ref().map(|s| s.id().to_string()),
            flat_number: record.flat_number.clone(),
            email: record.email.clone().unwrap_or_default(),
            visitor_type: record.visitor_type.clone(),
            status: record.status,
            date_time: record.date_time.map(|t| t.naive_utc()),
            description: record.description.clone(),
            expiry_date_time: record.additional_date_time.map(|t| t.naive_utc()),
        }
    }

    fn payload(draft: &EntryDraft, session: &Session) -> Result<EntryPermissionPayload, ValidationError> {
        required(&draft.name, "Name")?;
        let society_id = draft
            .society_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::MissingField("Society"))?;
        required(&draft.flat_number, "Flat number")?;
        let date_time = draft
            .date_time
            .ok_or(ValidationError::MissingField("Date & time"))?;
        required(&draft.description, "Description")?;
        let expiry = draft
            .expiry_date_time
            .ok_or(ValidationError::MissingField("Expiry date & time"))?;
        required(&draft.visitor_type, "Visitor type")?;

        if date_time >= expiry {
            return Err(ValidationError::ExpiryNotAfterEntry);
        }

        Ok(EntryPermissionPayload {
            name: draft.name.trim().to_string(),
            society_id: society_id.to_string(),
            flat_number: draft.flat_number.clone(),
            email: draft.email.clone(),
            visitor_type: draft.visitor_type.clone(),
            description: draft.description.trim().to_string(),
            status: draft.status,
            date_time,
            additional_date_time: expiry,
            expiration_date_time: date_time + Duration::days(PERMISSION_VALIDITY_DAYS),
            admin_email: session.account_email.clone(),
        })
    }
}

/// Entry permission list and form, with society/flat/email dependent fields
pub struct EntryPermissionScreen {
    list: ListScreen<EntryPermissions>,
    societies: Vec<Society>,
    residents: Vec<Resident>,
}

impl Deref for EntryPermissionScreen {
    type Target = ListScreen<EntryPermissions>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl DerefMut for EntryPermissionScreen {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.list
    }
}

impl EntryPermissionScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            list: ListScreen::new(ctx),
            societies: Vec::new(),
            residents: Vec::new(),
        }
    }

    /// Load entries, then the societies and residents used by the form
    pub async fn load(&mut self) -> Effect {
        let effect = self.list.load().await;
        if effect != Effect::Stay || !self.list.state().is_ready() {
            return effect;
        }
        self.load_reference_data().await
    }

    async fn load_reference_data(&mut self) -> Effect {
        let Some(session) = self.list.context().session().get() else {
            return self.list.redirect_to_login();
        };
        let ctx = self.list.context().clone();
        let cancel = self.list.lifecycle().cancel_flag().clone();
        let query = [("email", session.account_email.as_str())];
        let token = Some(session.token.as_str());

        let societies = ctx
            .resources
            .fetch_list_cancellable::<Society>(paths::SOCIETIES, &query, token, &cancel)
            .await;
        let residents = ctx
            .resources
            .fetch_list_cancellable::<Resident>(paths::USERS, &query, token, &cancel)
            .await;

        if !self.list.is_mounted() {
            return Effect::Stay;
        }

        match societies {
            Ok(societies) => self.societies = societies,
            Err(err) => {
                if let Some(effect) = self.reference_failed("societies", err) {
                    return effect;
                }
            }
        }
        match residents {
            Ok(residents) => self.residents = residents,
            Err(err) => {
                if let Some(effect) = self.reference_failed("residents", err) {
                    return effect;
                }
            }
        }
        Effect::Stay
    }

    /// Reference data failures never block the form
    fn reference_failed(&mut self, what: &str, err: ResourceError) -> Option<Effect> {
        match err {
            ResourceError::Unauthorized => Some(self.list.expire_session()),
            ResourceError::NotFound | ResourceError::Cancelled => None,
            err => {
                warn!("Error fetching {}: {}", what, err);
                self.list
                    .context()
                    .notify(Notice::warning(format!("Failed to load {} information", what)));
                None
            }
        }
    }

    /// Select the guard's own society, as recorded on the profile
    pub async fn preselect_guard_society(&mut self) -> Effect {
        let Some(session) = self.list.context().session().get() else {
            return self.list.redirect_to_login();
        };
        let ctx = self.list.context().clone();

        let profile = ctx
            .resources
            .fetch_one::<GuardProfile>(
                paths::GUARD_PROFILE,
                Some(session.token.as_str()),
                Some(self.list.lifecycle().cancel_flag()),
            )
            .await;

        if !self.list.is_mounted() {
            return Effect::Stay;
        }

        match profile {
            Ok(profile) => {
                if let Some(society) = profile.society {
                    let id = society.id.clone();
                    if !self.societies.iter().any(|s| s.id == id) {
                        self.societies.push(society);
                    }
                    self.set_society(Some(id));
                }
                Effect::Stay
            }
            Err(err) => self.reference_failed("society", err).unwrap_or(Effect::Stay),
        }
    }

    pub fn societies(&self) -> &[Society] {
        &self.societies
    }

    pub fn residents(&self) -> &[Resident] {
        &self.residents
    }

    /// The society currently chosen in the form
    pub fn selected_society(&self) -> Option<&Society> {
        let id = self.list.draft().society_id.as_deref()?;
        self.societies.iter().find(|s| s.id == id)
    }

    /// The flat selector is only usable once a society is chosen
    pub fn flat_selector_enabled(&self) -> bool {
        self.selected_society().is_some()
    }

    /// Flats offered by the flat selector
    pub fn available_flats(&self) -> &[String] {
        self.selected_society()
            .map(|s| s.flats.as_slice())
            .unwrap_or(&[])
    }

    /// Choose a society; clears the flat and email that belonged to the old one
    pub fn select_society(&mut self, society_id: Option<&str>) -> Result<(), ValidationError> {
        if let Some(id) = society_id {
            if !self.societies.iter().any(|s| s.id == id) {
                return Err(ValidationError::UnknownRecord(id.to_string()));
            }
        }

        self.set_society(society_id.map(str::to_string));
        Ok(())
    }

    fn set_society(&mut self, society_id: Option<String>) {
        let draft = self.list.draft_mut();
        draft.society_id = society_id;
        draft.flat_number.clear();
        draft.email.clear();
    }

    /// Choose a flat and autofill the resident's email when one is on record
    pub fn select_flat(&mut self, flat_number: &str) {
        let email = self
            .list
            .draft()
            .society_id
            .as_deref()
            .and_then(|society_id| {
                self.residents
                    .iter()
                    .find(|r| r.lives_in(society_id, flat_number))
            })
            .map(|r| r.email.clone())
            .unwrap_or_default();

        let draft = self.list.draft_mut();
        draft.flat_number = flat_number.to_string();
        draft.email = email;
    }

    /// Display name of the society an entry belongs to
    pub fn society_name(&self, entry: &EntryPermission) -> Option<String> {
        let society = entry.society_id.as_ref()?;
        society.name().map(str::to_string).or_else(|| {
            self.societies
                .iter()
                .find(|s| s.id == SocietyRef::id(society))
                .map(|s| s.name.clone())
        })
    }

    /// Warn about permissions that are about to lapse
    pub async fn check_expiring(&self) -> Vec<EntryPermission> {
        expiry::check_expiring(self.list.context()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 6, day).and_then(|d| d.and_hms_opt(hour, 0, 0))
    }

    fn draft() -> EntryDraft {
        EntryDraft {
            name: "Kiran".to_string(),
            society_id: Some("soc1".to_string()),
            flat_number: "A-101".to_string(),
            visitor_type: "Guest".to_string(),
            description: "Birthday".to_string(),
            date_time: at(1, 18),
            expiry_date_time: at(1, 23),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_sets_expiration_and_admin() {
        let session = Session::new("tok", "guard@example.com");
        let payload = EntryPermissions::payload(&draft(), &session).unwrap();

        assert_eq!(payload.expiration_date_time, at(8, 18).unwrap());
        assert_eq!(payload.additional_date_time, at(1, 23).unwrap());
        assert_eq!(payload.admin_email, "guard@example.com");
    }

    #[test]
    fn test_payload_validation_order() {
        let session = Session::new("tok", "guard@example.com");

        let missing_society = EntryDraft {
            society_id: None,
            flat_number: String::new(),
            ..draft()
        };
        assert_eq!(
            EntryPermissions::payload(&missing_society, &session),
            Err(ValidationError::MissingField("Society"))
        );

        let expiry_before_entry = EntryDraft {
            expiry_date_time: at(1, 9),
            ..draft()
        };
        assert_eq!(
            EntryPermissions::payload(&expiry_before_entry, &session),
            Err(ValidationError::ExpiryNotAfterEntry)
        );
    }
}
