//! Church media database client module.

pub mod api;
pub mod models;

pub use api::ChurchClient;
