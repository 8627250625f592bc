use serde::Serialize;

use crate::models::parcel::Parcel;
use crate::models::status::Status;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Pending,
    Transit,
    Delivered,
}

impl Status {
    pub fn bucket(self) -> Bucket {
        match self {
            Status::Booked | Status::Packed => Bucket::Pending,
            Status::InTransit | Status::OutForDelivery => Bucket::Transit,
            Status::Delivered => Bucket::Delivered,
        }
    }
}

/// Dashboard tallies. Parcels whose status the portal does not recognise are
/// counted in `unclassified` so the buckets always add up to `total`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DashboardCounts {
    pub total: usize,
    pub pending: usize,
    pub transit: usize,
    pub delivered: usize,
    pub unclassified: usize,
}

impl DashboardCounts {
    pub fn tally(parcels: &[Parcel]) -> Self {
        parcels.iter().fold(Self::default(), |mut counts, parcel| {
            counts.total += 1;
            match parcel.status().map(Status::bucket) {
                Ok(Bucket::Pending) => counts.pending += 1,
                Ok(Bucket::Transit) => counts.transit += 1,
                Ok(Bucket::Delivered) => counts.delivered += 1,
                Err(_) => counts.unclassified += 1,
            }
            counts
        })
    }
}
