pub mod account;
pub mod parcel;
pub mod role;
pub mod status;
