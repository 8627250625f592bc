use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("weight must be greater than 0, got {0}")]
    NonPositiveWeight(f64),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require, ValidationError};

    #[test]
    fn blank_values_are_missing() {
        assert_eq!(
            require("receiver_name", "   "),
            Err(ValidationError::Required("receiver_name"))
        );
        assert!(require("receiver_name", "Asha").is_ok());
    }
}
