use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::role::Role;

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no credential")]
    Missing,

    #[error("credential has {segments} segments, expected 3")]
    Malformed { segments: usize },

    #[error("credential payload is not base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("credential payload is not a valid claims object: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Decoded credential payload. `role` is required; unknown claims are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub role: Role,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// Expiry as carried by the token. Informative only, nothing enforces it here.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Single trusted entry point for reading a credential.
///
/// Signature verification is not performed; the backend remains the authority.
pub fn decode(credential: Option<&str>) -> Result<Claims, DecodeError> {
    let credential = credential
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or(DecodeError::Missing)?;

    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Malformed {
            segments: segments.len(),
        });
    }

    let payload = decode_segment(segments[1])?;
    let value: Value = serde_json::from_slice(&payload)?;
    if !value.is_object() {
        return Err(DecodeError::Payload(serde::de::Error::custom(
            "claims must be a JSON object",
        )));
    }

    let claims = serde_json::from_value(value)?;
    Ok(claims)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|_| STANDARD_LENIENT.decode(segment))
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use base64::Engine;

    use super::{decode, DecodeError};
    use crate::models::role::Role;
    use crate::session::testing::{token, token_for};

    #[test]
    fn decodes_each_known_role() {
        for role in Role::ALL {
            let claims = decode(Some(&token_for(role.as_str()))).unwrap();
            assert_eq!(claims.role, role);
            assert_eq!(claims.sub.as_deref(), Some(format!("{role}@example.com").as_str()));
        }
    }

    #[test]
    fn absent_or_blank_credential_is_missing() {
        assert!(matches!(decode(None), Err(DecodeError::Missing)));
        assert!(matches!(decode(Some("")), Err(DecodeError::Missing)));
        assert!(matches!(decode(Some("   ")), Err(DecodeError::Missing)));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        assert!(matches!(
            decode(Some("onlyone")),
            Err(DecodeError::Malformed { segments: 1 })
        ));
        assert!(matches!(
            decode(Some("a.b")),
            Err(DecodeError::Malformed { segments: 2 })
        ));
        assert!(matches!(
            decode(Some("a.b.c.d")),
            Err(DecodeError::Malformed { segments: 4 })
        ));
    }

    #[test]
    fn non_base64_middle_segment_is_rejected() {
        assert!(matches!(
            decode(Some("header.@@not*base64@@.sig")),
            Err(DecodeError::Encoding(_))
        ));
    }

    #[test]
    fn base64_of_non_json_is_rejected() {
        let credential = format!("h.{}.s", URL_SAFE_NO_PAD.encode("hello world"));
        assert!(matches!(
            decode(Some(&credential)),
            Err(DecodeError::Payload(_))
        ));
    }

    #[test]
    fn payload_without_known_role_is_rejected() {
        assert!(matches!(
            decode(Some(&token(r#"{"sub":"x"}"#))),
            Err(DecodeError::Payload(_))
        ));
        assert!(matches!(
            decode(Some(&token(r#"{"role":"admin"}"#))),
            Err(DecodeError::Payload(_))
        ));
        assert!(matches!(
            decode(Some(&token(r#"["staff"]"#))),
            Err(DecodeError::Payload(_))
        ));
    }

    #[test]
    fn positional_array_payloads_are_not_claims() {
        for payload in [r#"["staff"]"#, r#"["rider","x",5]"#, r#""customer""#, "42"] {
            assert!(
                matches!(decode(Some(&token(payload))), Err(DecodeError::Payload(_))),
                "payload {payload} decoded"
            );
        }
    }

    #[test]
    fn accepts_padded_standard_alphabet_payloads() {
        let credential = format!("h.{}.s", STANDARD.encode(r#"{"role":"customer"}"#));
        assert_eq!(decode(Some(&credential)).unwrap().role, Role::Customer);
    }

    #[test]
    fn missing_exp_has_no_expiry() {
        let claims = decode(Some(&token(r#"{"role":"staff"}"#))).unwrap();
        assert_eq!(claims.expires_at(), None);
    }
}
