use serde::{Deserialize, Serialize};

use crate::lifecycle::charges::charges;
use crate::lifecycle::transitions::TransitionError;
use crate::models::status::Status;
use crate::validation::{require, ValidationError};

/// Parcel record as returned by the backend.
///
/// `current_status` stays a raw string so a single unexpected value from the
/// backend does not fail a whole listing; use [`Parcel::status`] to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parcel {
    pub parcel_id: i64,
    pub tracking_number: String,
    #[serde(default)]
    pub sender_id: Option<i64>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub weight_kg: f64,
    #[serde(default)]
    pub charges: f64,
    pub current_status: String,
    #[serde(default)]
    pub booked_at: Option<String>,
}

impl Parcel {
    pub fn status(&self) -> Result<Status, TransitionError> {
        self.current_status
            .parse()
            .map_err(|_| TransitionError::UnknownState(self.current_status.clone()))
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.tracking_number.to_lowercase().contains(&query)
            || self.receiver_name.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParcel {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub weight_kg: f64,
}

impl NewParcel {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_receiver(
            &self.receiver_name,
            &self.receiver_phone,
            &self.receiver_address,
            self.weight_kg,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelUpdate {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub weight_kg: f64,
}

impl ParcelUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_receiver(
            &self.receiver_name,
            &self.receiver_phone,
            &self.receiver_address,
            self.weight_kg,
        )
    }
}

fn validate_receiver(
    name: &str,
    phone: &str,
    address: &str,
    weight_kg: f64,
) -> Result<(), ValidationError> {
    require("receiver_name", name)?;
    require("receiver_phone", phone)?;
    require("receiver_address", address)?;
    charges(weight_kg).map(|_| ())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedParcel {
    #[serde(default)]
    pub parcel_id: Option<i64>,
    pub tracking_number: String,
    pub charges: f64,
}

#[cfg(test)]
mod tests {
    use super::{NewParcel, Parcel};
    use crate::lifecycle::transitions::TransitionError;
    use crate::models::status::Status;
    use crate::validation::ValidationError;

    fn parcel(tracking: &str, receiver: &str, status: &str) -> Parcel {
        Parcel {
            parcel_id: 7,
            tracking_number: tracking.to_string(),
            sender_id: Some(1),
            receiver_name: receiver.to_string(),
            receiver_phone: "9000000000".to_string(),
            receiver_address: "12 Lake Road".to_string(),
            weight_kg: 2.0,
            charges: 100.0,
            current_status: status.to_string(),
            booked_at: None,
        }
    }

    #[test]
    fn search_matches_tracking_or_receiver_case_insensitively() {
        let p = parcel("TRK20240101120000", "Meera Nair", "booked");
        assert!(p.matches(""));
        assert!(p.matches("trk2024"));
        assert!(p.matches("  NAIR "));
        assert!(!p.matches("lake road"));
    }

    #[test]
    fn status_reports_unknown_values() {
        assert_eq!(parcel("T1", "A", "packed").status(), Ok(Status::Packed));
        assert_eq!(
            parcel("T1", "A", "lost").status(),
            Err(TransitionError::UnknownState("lost".to_string()))
        );
    }

    #[test]
    fn backend_payload_without_optional_fields_deserializes() {
        let json = r#"{
            "parcel_id": 3,
            "tracking_number": "TRK1",
            "receiver_name": "Ravi",
            "receiver_phone": "1",
            "receiver_address": "x",
            "weight_kg": 1.5,
            "current_status": "in transit"
        }"#;
        let p: Parcel = serde_json::from_str(json).unwrap();
        assert_eq!(p.sender_id, None);
        assert_eq!(p.charges, 0.0);
        assert_eq!(p.status(), Ok(Status::InTransit));
    }

    #[test]
    fn new_parcel_rejects_blank_fields_and_bad_weight() {
        let mut draft = NewParcel {
            receiver_name: "Ravi".to_string(),
            receiver_phone: "98".to_string(),
            receiver_address: "Main St".to_string(),
            weight_kg: 1.0,
        };
        assert!(draft.validate().is_ok());

        draft.weight_kg = 0.0;
        assert_eq!(draft.validate(), Err(ValidationError::NonPositiveWeight(0.0)));

        draft.weight_kg = 1.0;
        draft.receiver_phone = " ".to_string();
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required("receiver_phone"))
        );
    }
}
