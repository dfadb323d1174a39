//! Resident vehicle register

use crate::debounce::{Debounce, SearchTicket};
use crate::list::{ListScreen, ScreenResource};
use crate::state::{required, Effect, ValidationError};
use crate::ScreenContext;
use guard_portal_resources::{paths, Vehicle, VehiclePayload, VehicleType};
use guard_portal_session::Session;
use log::debug;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleDraft {
    pub owner_name: String,
    pub flat_number: String,
    pub vehicle_type: VehicleType,
    pub vehicle_name: String,
    pub number_plate: String,
}

/// The `vehicles` collection
pub struct Vehicles;

impl ScreenResource for Vehicles {
    type Record = Vehicle;
    type Draft = VehicleDraft;
    type Payload = VehiclePayload;

    const PATH: &'static str = paths::VEHICLES;
    const NOUN: &'static str = "Vehicle";

    fn list_query(_session: &Session) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn search_fields(record: &Vehicle) -> Vec<&str> {
        vec![
            record.owner_name.as_str(),
            record.flat_number.as_str(),
            record.vehicle_name.as_str(),
            record.number_plate.as_str(),
        ]
    }

    fn draft_from(record: &Vehicle) -> VehicleDraft {
        VehicleDraft {
            owner_name: record.owner_name.clone(),
            flat_number: record.flat_number.clone(),
            vehicle_type: record.vehicle_type,
            vehicle_name: record.vehicle_name.clone(),
            number_plate: record.number_plate.clone(),
        }
    }

    fn payload(draft: &VehicleDraft, _session: &Session) -> Result<VehiclePayload, ValidationError> {
        required(&draft.owner_name, "Owner name")?;
        required(&draft.flat_number, "Flat number")?;
        required(&draft.vehicle_name, "Vehicle name")?;
        required(&draft.number_plate, "Number plate")?;

        Ok(VehiclePayload {
            owner_name: draft.owner_name.trim().to_string(),
            flat_number: draft.flat_number.trim().to_string(),
            vehicle_type: draft.vehicle_type,
            vehicle_name: draft.vehicle_name.trim().to_string(),
            number_plate: draft.number_plate.trim().to_uppercase(),
        })
    }
}

/// Vehicle list with server-side search
///
/// Every keystroke goes through [`search_input`](Self::search_input) or a
/// [`search_handle`](Self::search_handle); only the ticket of the last
/// keystroke reaches the backend once the debounce delay has passed.
pub struct VehicleScreen {
    list: ListScreen<Vehicles>,
    debounce: Debounce,
}

impl Deref for VehicleScreen {
    type Target = ListScreen<Vehicles>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl DerefMut for VehicleScreen {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.list
    }
}

impl VehicleScreen {
    pub fn new(ctx: ScreenContext) -> Self {
        let debounce = Debounce::new(ctx.search_debounce);
        Self {
            list: ListScreen::new(ctx),
            debounce,
        }
    }

    /// The search box contents
    pub fn query(&self) -> String {
        self.debounce.latest_term()
    }

    /// Record a keystroke in the search box
    pub fn search_input(&self, term: impl Into<String>) -> SearchTicket {
        self.debounce.issue(term)
    }

    /// Keystroke recorder that shares this screen's debounce
    ///
    /// Input handlers that do not own the screen issue tickets through this,
    /// await [`SearchTicket::settle`] on their own and only then hand the
    /// ticket to [`apply_search`](Self::apply_search).
    pub fn search_handle(&self) -> Debounce {
        self.debounce.clone()
    }

    /// Run the search for `ticket` once it has settled
    ///
    /// Stale tickets return without touching the network, as do results
    /// that arrive after a newer keystroke. An empty term reloads the full
    /// list.
    pub async fn apply_search(&mut self, ticket: SearchTicket) -> Effect {
        if !ticket.settle().await {
            debug!("Dropping stale vehicle search '{}'", ticket.term());
            return Effect::Stay;
        }

        let term = ticket.term().trim();
        if term.is_empty() {
            return self.list.load().await;
        }

        let Some(session) = self.list.context().session().get() else {
            return self.list.redirect_to_login();
        };
        let ctx = self.list.context().clone();
        let result = ctx
            .resources
            .fetch_list_cancellable::<Vehicle>(
                paths::VEHICLES_SEARCH,
                &[("query", term)],
                Some(session.token.as_str()),
                self.list.lifecycle().cancel_flag(),
            )
            .await;

        if !ticket.is_current() {
            debug!("Dropping superseded vehicle results for '{}'", ticket.term());
            return Effect::Stay;
        }
        self.list.apply_list(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_normalises_plate() {
        let session = Session::new("tok", "guard@example.com");
        let draft = VehicleDraft {
            owner_name: "Meera".to_string(),
            flat_number: "B-204".to_string(),
            vehicle_type: VehicleType::Car,
            vehicle_name: "Swift".to_string(),
            number_plate: " mh12ab1234 ".to_string(),
        };
        let payload = Vehicles::payload(&draft, &session).unwrap();
        assert_eq!(payload.number_plate, "MH12AB1234");

        let draft = VehicleDraft {
            number_plate: String::new(),
            ..draft
        };
        assert_eq!(
            Vehicles::payload(&draft, &session),
            Err(ValidationError::MissingField("Number plate"))
        );
    }
}
