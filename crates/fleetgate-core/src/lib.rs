//! Fleetgate Core — domain models, the permission catalog, and the
//! repository traits shared across all crates.

pub mod catalog;
pub mod error;
pub mod models;
pub mod repository;
