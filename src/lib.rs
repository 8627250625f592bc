pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod session;
pub mod state;
pub mod validation;
