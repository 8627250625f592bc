use thiserror::Error;
use tracing::{debug, warn};

use crate::models::role::Role;
use crate::session::credential::decode;
use crate::session::store::SessionStore;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("no credential")]
    NoCredential,

    #[error("credential is invalid")]
    Invalid,

    #[error("role does not match")]
    RoleMismatch,
}

impl AuthzError {
    pub fn label(self) -> &'static str {
        match self {
            AuthzError::NoCredential => "no_credential",
            AuthzError::Invalid => "invalid",
            AuthzError::RoleMismatch => "role_mismatch",
        }
    }
}

/// Decide whether the stored credential admits a view.
///
/// A credential that fails to decode is purged from the store before denying,
/// otherwise every later check would bounce on the same corrupt value.
pub fn authorize(store: &dyn SessionStore, required: Option<Role>) -> Result<Role, AuthzError> {
    let Some(credential) = store.get() else {
        return Err(AuthzError::NoCredential);
    };

    let claims = match decode(Some(&credential)) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = %err, "purging undecodable credential");
            if let Err(err) = store.clear() {
                warn!(error = %err, "failed to purge credential");
            }
            return Err(AuthzError::Invalid);
        }
    };

    match required {
        Some(required) if required != claims.role => {
            debug!(required = %required, actual = %claims.role, "role mismatch");
            Err(AuthzError::RoleMismatch)
        }
        _ => Ok(claims.role),
    }
}

pub fn route_for(role: Role) -> &'static str {
    match role {
        Role::Staff => "/staff/dashboard",
        Role::Customer => "/customer/dashboard",
        Role::Rider => "/rider/dashboard",
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::{authorize, route_for, AuthzError};
    use crate::models::role::Role;
    use crate::session::store::{MemorySessionStore, SessionStore};
    use crate::session::testing::{token, token_for};

    fn store_with(credential: &str) -> MemorySessionStore {
        MemorySessionStore::with_credential(8, credential)
    }

    #[test]
    fn no_credential_is_denied_without_side_effects() {
        let store = MemorySessionStore::new(8);
        assert_eq!(authorize(&store, None), Err(AuthzError::NoCredential));
        assert_eq!(
            authorize(&store, Some(Role::Staff)),
            Err(AuthzError::NoCredential)
        );
    }

    #[test]
    fn malformed_credentials_are_denied_and_purged() {
        let malformed = [
            "".to_string(),
            "single-segment".to_string(),
            "h.!!!.s".to_string(),
            format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text")),
            token(r#"{"sub":"nobody"}"#),
            token(r#"["staff"]"#),
        ];

        for credential in malformed {
            let store = store_with(&credential);
            assert_eq!(
                authorize(&store, None),
                Err(AuthzError::Invalid),
                "credential {credential:?}"
            );
            assert_eq!(store.get(), None, "credential {credential:?} not purged");
        }
    }

    #[test]
    fn matching_role_is_allowed() {
        for role in Role::ALL {
            let store = store_with(&token_for(role.as_str()));
            assert_eq!(authorize(&store, Some(role)), Ok(role));
            assert_eq!(authorize(&store, None), Ok(role));
        }
    }

    #[test]
    fn mismatched_role_is_denied_but_kept() {
        for role in Role::ALL {
            let store = store_with(&token_for(role.as_str()));
            for other in Role::ALL.into_iter().filter(|r| *r != role) {
                assert_eq!(
                    authorize(&store, Some(other)),
                    Err(AuthzError::RoleMismatch)
                );
            }
            assert!(store.get().is_some());
        }
    }

    #[test]
    fn every_role_has_a_distinct_landing_path() {
        assert_eq!(route_for(Role::Staff), "/staff/dashboard");
        assert_eq!(route_for(Role::Customer), "/customer/dashboard");
        assert_eq!(route_for(Role::Rider), "/rider/dashboard");
    }
}
