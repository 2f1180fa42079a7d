//! Domain logic for the RetroGameHub marketplace.
//!
//! Everything here is free of I/O so it can be shared by the repository
//! layer, the HTTP layer and tests without a database.

pub mod audit;
pub mod discount;
pub mod error;
pub mod pricing;
pub mod types;
