use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Customer,
    Rider,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Staff, Role::Customer, Role::Rider];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Customer => "customer",
            Role::Rider => "rider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}, expected staff/customer/rider")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Role::Staff),
            "customer" => Ok(Role::Customer),
            "rider" => Ok(Role::Rider),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
