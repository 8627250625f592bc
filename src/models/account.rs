use serde::{Deserialize, Serialize};

use crate::models::role::Role;
use crate::validation::{require, ValidationError};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::Registration;
    use crate::models::role::Role;
    use crate::validation::ValidationError;

    #[test]
    fn registration_requires_a_six_character_password() {
        let mut reg = Registration {
            name: "Kiran".to_string(),
            email: "kiran@example.com".to_string(),
            phone: None,
            password: "12345".to_string(),
            role: Role::Customer,
        };
        assert_eq!(
            reg.validate(),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );

        reg.password = "123456".to_string();
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn registration_rejects_unknown_roles_at_the_boundary() {
        let json = r#"{"name":"a","email":"b","password":"cccccc","role":"admin"}"#;
        assert!(serde_json::from_str::<Registration>(json).is_err());
    }
}
