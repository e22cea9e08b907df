//! Parcel domain module.
//!
//! This crate contains the parcel lifecycle rules, implemented purely as
//! deterministic domain logic (no IO, no storage).

pub mod address;
pub mod parcel;

pub use address::DeliveryAddress;
pub use parcel::{Parcel, ParcelStatus};
