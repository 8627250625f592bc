use serde_json::Value;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "request failed";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    pub fn outcome(&self) -> &'static str {
        match self {
            BackendError::Unauthorized | BackendError::Status { status: 401, .. } => {
                "unauthorized"
            }
            BackendError::Status { .. } => "error",
            BackendError::Transport(_) => "transport",
            BackendError::InvalidUrl(_) => "config",
        }
    }
}

/// Pull the human-readable message out of an error body, if the server sent one.
pub fn server_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return GENERIC_FAILURE.to_string();
    };

    ["detail", "error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|msg| !msg.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{server_message, GENERIC_FAILURE};

    #[test]
    fn prefers_detail_then_error_then_message() {
        assert_eq!(server_message(r#"{"detail":"Parcel not found"}"#), "Parcel not found");
        assert_eq!(server_message(r#"{"error":"nope"}"#), "nope");
        assert_eq!(server_message(r#"{"message":"later"}"#), "later");
    }

    #[test]
    fn falls_back_when_no_string_message() {
        assert_eq!(server_message(""), GENERIC_FAILURE);
        assert_eq!(server_message("<html>bad gateway</html>"), GENERIC_FAILURE);
        assert_eq!(
            server_message(r#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#),
            GENERIC_FAILURE
        );
    }
}
