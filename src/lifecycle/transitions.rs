use thiserror::Error;

use crate::models::status::Status;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Parcel already delivered")]
    AlreadyTerminal,

    #[error("unknown parcel status: {0:?}")]
    UnknownState(String),
}

/// Next status for the one-click advance action.
///
/// `booked` and `packed` both move to `in transit`; `delivered` has no successor.
pub fn next_status(current: Status) -> Result<Status, TransitionError> {
    match current {
        Status::Booked | Status::Packed => Ok(Status::InTransit),
        Status::InTransit => Ok(Status::OutForDelivery),
        Status::OutForDelivery => Ok(Status::Delivered),
        Status::Delivered => Err(TransitionError::AlreadyTerminal),
    }
}

pub fn advance(raw: &str) -> Result<Status, TransitionError> {
    next_status(parse_status(raw)?)
}

/// Staff override: any known status is accepted, including regressions.
/// Whether the change is allowed is decided by the backend.
pub fn set_status_unconstrained(raw: &str) -> Result<Status, TransitionError> {
    parse_status(raw)
}

fn parse_status(raw: &str) -> Result<Status, TransitionError> {
    raw.parse()
        .map_err(|_| TransitionError::UnknownState(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{advance, next_status, set_status_unconstrained, TransitionError};
    use crate::models::status::Status;

    #[test]
    fn forward_mapping_is_total_over_known_statuses() {
        let expected = [
            (Status::Booked, Ok(Status::InTransit)),
            (Status::Packed, Ok(Status::InTransit)),
            (Status::InTransit, Ok(Status::OutForDelivery)),
            (Status::OutForDelivery, Ok(Status::Delivered)),
            (Status::Delivered, Err(TransitionError::AlreadyTerminal)),
        ];

        for (from, to) in expected {
            assert_eq!(next_status(from), to, "advancing from {from}");
        }
    }

    #[test]
    fn advancing_never_regresses() {
        for status in Status::ALL {
            if let Ok(next) = next_status(status) {
                assert!(next > status);
            }
        }
    }

    #[test]
    fn repeated_advance_reaches_terminal_without_looping() {
        let mut status = Status::Booked;
        let mut steps = 0;
        while let Ok(next) = next_status(status) {
            status = next;
            steps += 1;
            assert!(steps <= Status::ALL.len());
        }
        assert_eq!(status, Status::Delivered);
        assert_eq!(steps, 3);
    }

    #[test]
    fn unknown_raw_status_is_an_error_not_a_noop() {
        assert_eq!(
            advance("returned"),
            Err(TransitionError::UnknownState("returned".to_string()))
        );
        assert_eq!(advance("in transit"), Ok(Status::OutForDelivery));
    }

    #[test]
    fn unconstrained_set_allows_regression() {
        assert_eq!(set_status_unconstrained("booked"), Ok(Status::Booked));
        assert!(set_status_unconstrained("bogus").is_err());
    }
}
