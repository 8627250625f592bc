//! Session state derived from the stored bearer credential.
//!
//! The credential lives in a single [`store::SessionStore`] slot. Everything
//! else here is recomputed from that slot on demand: [`credential::decode`]
//! reads the claims, [`authorizer::authorize`] gates role-scoped views, and
//! [`sync::SessionWatcher`] keeps open views reconciled with the slot.

pub mod authorizer;
pub mod credential;
pub mod store;
pub mod sync;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::role::Role;
use crate::session::credential::decode;

/// Snapshot of the session as seen by a view. Never persisted.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Session {
    pub present: bool,
    pub role: Option<Role>,
    pub valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn from_credential(credential: Option<&str>) -> Self {
        let Some(raw) = credential else {
            return Self::default();
        };

        match decode(Some(raw)) {
            Ok(claims) => Self {
                present: true,
                role: Some(claims.role),
                valid: true,
                expires_at: claims.expires_at(),
            },
            Err(_) => Self {
                present: true,
                role: None,
                valid: false,
                expires_at: None,
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::token_for;
    use super::Session;
    use crate::models::role::Role;

    #[test]
    fn absent_credential_is_an_empty_session() {
        assert_eq!(Session::from_credential(None), Session::default());
    }

    #[test]
    fn decodable_credential_yields_role_and_expiry() {
        let session = Session::from_credential(Some(&token_for("rider")));
        assert!(session.present && session.valid);
        assert_eq!(session.role, Some(Role::Rider));
        assert_eq!(
            session.expires_at.map(|t| t.timestamp()),
            Some(1_893_456_000)
        );
    }

    #[test]
    fn garbage_credential_is_present_but_invalid() {
        let session = Session::from_credential(Some("not-a-token"));
        assert!(session.present);
        assert!(!session.valid);
        assert_eq!(session.role, None);
    }
}
