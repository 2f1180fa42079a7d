//! Request identity extractors.
//!
//! - [`seller::SellerActor`] -- Identifies the seller performing a mutation.

pub mod seller;
