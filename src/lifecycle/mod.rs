pub mod buckets;
pub mod charges;
pub mod transitions;
