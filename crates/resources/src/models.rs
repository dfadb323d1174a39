//! Wire types of the portal backend

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything with a backend identifier
pub trait Record {
    fn id(&self) -> &str;
}

/// Lifecycle status shared by entry permissions and service entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    #[default]
    Pending,
    Allow,
    Deny,
    CheckedIn,
    CheckedOut,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::CheckedIn => "checked-in",
            Self::CheckedOut => "checked-out",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A society reference, either a bare id or the populated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SocietyRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl SocietyRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated { name, .. } => name.as_deref(),
        }
    }
}

/// A managed residential complex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Society {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flats: Vec<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
}

impl Record for Society {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A resident account, used to autofill the email of a flat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub flat_number: Option<String>,
    #[serde(default)]
    pub society: Option<SocietyRef>,
}

impl Resident {
    /// Whether this resident lives in `flat_number` of society `society_id`
    pub fn lives_in(&self, society_id: &str, flat_number: &str) -> bool {
        self.flat_number.as_deref() == Some(flat_number)
            && self.society.as_ref().map(SocietyRef::id) == Some(society_id)
    }
}

impl Record for Resident {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A visitor entry permission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPermission {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub society_id: Option<SocietyRef>,
    #[serde(default)]
    pub flat_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub visitor_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: EntryStatus,
    /// Expected arrival
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
    /// Expiry chosen by the guard
    #[serde(default)]
    pub additional_date_time: Option<DateTime<Utc>>,
    /// Expiry computed by the server
    #[serde(default)]
    pub expiration_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for EntryPermission {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body for creating or updating an [`EntryPermission`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPermissionPayload {
    pub name: String,
    pub society_id: String,
    pub flat_number: String,
    pub email: String,
    pub visitor_type: String,
    pub description: String,
    pub status: EntryStatus,
    pub date_time: NaiveDateTime,
    pub additional_date_time: NaiveDateTime,
    pub expiration_date_time: NaiveDateTime,
    pub admin_email: String,
}

/// A daily service visitor (newspaper, postman, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub society_id: Option<SocietyRef>,
    #[serde(default)]
    pub visitor_type: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `data:` URL of the visitor photo
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for ServiceEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body for creating or updating a [`ServiceEntry`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntryPayload {
    pub name: String,
    pub phone_number: String,
    pub society_id: String,
    pub visitor_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub admin_email: String,
    pub status: EntryStatus,
}

/// Partial update that only moves an entry's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Bike,
    Car,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Car => "car",
        }
    }
}

/// A resident vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_name: String,
    pub flat_number: String,
    pub vehicle_type: VehicleType,
    pub vehicle_name: String,
    pub number_plate: String,
}

impl Record for Vehicle {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body for creating or updating a [`Vehicle`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    pub owner_name: String,
    pub flat_number: String,
    pub vehicle_type: VehicleType,
    pub vehicle_name: String,
    pub number_plate: String,
}

/// The signed-in guard as returned by `guard/guard-profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardProfile {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub society: Option<Society>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_entry_with_populated_society() {
        let entry: ServiceEntry = serde_json::from_value(json!({
            "_id": "s1",
            "name": "Ravi",
            "phoneNumber": "9876543210",
            "societyId": { "_id": "soc1", "name": "Green Park" },
            "visitorType": "Postman",
            "status": "checked-in",
            "checkInTime": "2024-05-01T08:30:00.000Z"
        }))
        .unwrap();

        let society = entry.society_id.unwrap();
        assert_eq!(society.id(), "soc1");
        assert_eq!(society.name(), Some("Green Park"));
        assert_eq!(entry.status, EntryStatus::CheckedIn);
        assert!(entry.check_in_time.is_some());
    }

    #[test]
    fn test_entry_permission_with_bare_society_id() {
        let entry: EntryPermission = serde_json::from_value(json!({
            "_id": "e1",
            "name": "Asha",
            "societyId": "soc1",
            "flatNumber": "A-101",
            "visitorType": "Swiggy/Zomato",
            "description": "Dinner",
            "status": "allow"
        }))
        .unwrap();

        assert_eq!(entry.society_id, Some(SocietyRef::Id("soc1".to_string())));
        assert_eq!(entry.status, EntryStatus::Allow);
        assert!(entry.date_time.is_none());
    }

    #[test]
    fn test_resident_lives_in() {
        let resident: Resident = serde_json::from_value(json!({
            "_id": "u1",
            "email": "resident@example.com",
            "flatNumber": "A-101",
            "society": { "_id": "soc1", "name": "Green Park" }
        }))
        .unwrap();

        assert!(resident.lives_in("soc1", "A-101"));
        assert!(!resident.lives_in("soc2", "A-101"));
        assert!(!resident.lives_in("soc1", "A-102"));
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let body = serde_json::to_value(StatusUpdate {
            status: EntryStatus::CheckedOut,
        })
        .unwrap();
        assert_eq!(body, json!({ "status": "checked-out" }));
    }
}
