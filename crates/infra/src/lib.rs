//! Infrastructure layer: parcel storage, configuration, lifecycle service.

pub mod config;
pub mod parcel_service;
pub mod parcel_store;


pub use config::TrackerConfig;
pub use parcel_service::{ParcelService, ServiceError};
pub use parcel_store::{
    InMemoryParcelStore, NewParcelRow, ParcelRow, ParcelStore, ParcelStoreError,
    SqliteParcelStore,
};
