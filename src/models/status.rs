use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Delivery stage of a parcel, in lifecycle order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    #[serde(rename = "booked")]
    Booked,
    #[serde(rename = "packed")]
    Packed,
    #[serde(rename = "in transit")]
    InTransit,
    #[serde(rename = "out for delivery")]
    OutForDelivery,
    #[serde(rename = "delivered")]
    Delivered,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Booked,
        Status::Packed,
        Status::InTransit,
        Status::OutForDelivery,
        Status::Delivered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Booked => "booked",
            Status::Packed => "packed",
            Status::InTransit => "in transit",
            Status::OutForDelivery => "out for delivery",
            Status::Delivered => "delivered",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Status::Delivered
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
