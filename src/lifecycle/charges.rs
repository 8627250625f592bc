use crate::models::parcel::Parcel;
use crate::validation::ValidationError;

/// Currency units per kilogram.
pub const RATE_PER_KG: f64 = 50.0;

pub fn charges(weight_kg: f64) -> Result<f64, ValidationError> {
    if !weight_kg.is_finite() {
        return Err(ValidationError::NotANumber(weight_kg.to_string()));
    }
    if weight_kg <= 0.0 {
        return Err(ValidationError::NonPositiveWeight(weight_kg));
    }
    Ok(weight_kg * RATE_PER_KG)
}

pub fn parse_weight(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required("weight_kg"));
    }

    let weight: f64 = raw
        .parse()
        .map_err(|_| ValidationError::NotANumber(raw.to_string()))?;
    charges(weight)?;
    Ok(weight)
}

/// Display estimate for partially entered input. Never fails; anything that is
/// not a positive weight shows as 0.
pub fn estimate(raw: &str) -> f64 {
    parse_weight(raw).and_then(charges).unwrap_or(0.0)
}

/// Charges after a staff edit: the stored amount survives unless the weight moved.
pub fn charges_after_edit(previous: &Parcel, new_weight_kg: f64) -> Result<f64, ValidationError> {
    if new_weight_kg == previous.weight_kg {
        return Ok(previous.charges);
    }
    charges(new_weight_kg)
}

#[cfg(test)]
mod tests {
    use super::{charges, charges_after_edit, estimate, parse_weight, RATE_PER_KG};
    use crate::models::parcel::Parcel;
    use crate::validation::ValidationError;

    #[test]
    fn charges_are_exactly_rate_times_weight() {
        for w in [0.1, 1.0, 2.5, 12.75, 1000.0] {
            assert_eq!(charges(w), Ok(w * RATE_PER_KG));
        }
        assert_eq!(charges(3.0), Ok(150.0));
    }

    #[test]
    fn non_positive_and_non_numeric_weights_are_rejected() {
        assert_eq!(charges(0.0), Err(ValidationError::NonPositiveWeight(0.0)));
        assert_eq!(charges(-2.0), Err(ValidationError::NonPositiveWeight(-2.0)));
        assert!(matches!(charges(f64::NAN), Err(ValidationError::NotANumber(_))));
        assert_eq!(
            charges(f64::INFINITY),
            Err(ValidationError::NotANumber("inf".to_string()))
        );
        assert_eq!(
            charges(f64::NEG_INFINITY),
            Err(ValidationError::NotANumber("-inf".to_string()))
        );
        assert_eq!(parse_weight(""), Err(ValidationError::Required("weight_kg")));
        assert_eq!(
            parse_weight("two"),
            Err(ValidationError::NotANumber("two".to_string()))
        );
        assert_eq!(
            parse_weight("inf"),
            Err(ValidationError::NotANumber("inf".to_string()))
        );
    }

    #[test]
    fn estimate_shows_zero_for_partial_input() {
        assert_eq!(estimate(""), 0.0);
        assert_eq!(estimate("abc"), 0.0);
        assert_eq!(estimate("NaN"), 0.0);
        assert_eq!(estimate("-1"), 0.0);
        assert_eq!(estimate("infinity"), 0.0);
        assert_eq!(estimate(" 2 "), 100.0);
    }

    #[test]
    fn edit_keeps_charges_unless_weight_changes() {
        let previous = Parcel {
            parcel_id: 1,
            tracking_number: "TRK1".to_string(),
            sender_id: None,
            receiver_name: "A".to_string(),
            receiver_phone: "1".to_string(),
            receiver_address: "x".to_string(),
            weight_kg: 2.0,
            charges: 90.0,
            current_status: "booked".to_string(),
            booked_at: None,
        };

        assert_eq!(charges_after_edit(&previous, 2.0), Ok(90.0));
        assert_eq!(charges_after_edit(&previous, 4.0), Ok(200.0));
        assert!(charges_after_edit(&previous, 0.0).is_err());
    }
}
