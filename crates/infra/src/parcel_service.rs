//! Parcel lifecycle service (application-level orchestration).
//!
//! `ParcelService` is the only place where lifecycle rules live:
//!
//! ```text
//! caller
//!   ↓
//! 1. Validate input (address, target status); nothing touches storage on failure
//!   ↓
//! 2. Issue exactly one store statement (status guard inside the statement)
//!   ↓
//! 3. Interpret rows / rows-affected into success, Precondition or Storage
//! ```
//!
//! Conditional changes are compare-and-swap on the `status` column, so two
//! racing deletes of the same registered parcel cannot both succeed.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use parceltrack_core::{ClientId, DomainError, ParcelNumber};
use parceltrack_parcels::{DeliveryAddress, Parcel, ParcelStatus};

use crate::parcel_store::{NewParcelRow, ParcelRow, ParcelStore, ParcelStoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input rejected before touching storage.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Parcel missing or not in the required status.
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// Storage access or row deserialization failed.
    #[error(transparent)]
    Storage(#[from] ParcelStoreError),
}

impl ServiceError {
    /// Preconditions are expected outcomes ("already shipped"), not faults.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ServiceError::Precondition(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::Precondition(msg) => ServiceError::Precondition(msg),
        }
    }
}

/// Enforces the parcel lifecycle on top of a `ParcelStore`.
///
/// The service exclusively owns its store handle. Share a store between
/// services (or with tests) by passing an `Arc<S>`.
#[derive(Debug)]
pub struct ParcelService<S> {
    store: S,
}

impl<S> ParcelService<S>
where
    S: ParcelStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Register a new parcel in `registered` status and return its number.
    pub async fn register_parcel(
        &self,
        client: ClientId,
        address: &str,
    ) -> Result<ParcelNumber, ServiceError> {
        let address = DeliveryAddress::parse(address)?;

        let number = self
            .store
            .insert(NewParcelRow {
                client,
                status: ParcelStatus::Registered,
                address: address.into_inner(),
                created_at: format_timestamp(Utc::now()),
            })
            .await?;

        tracing::info!(parcel.number = %number, client = %client, "parcel registered");
        Ok(number)
    }

    /// All parcels owned by `client`, with stored text decoded into domain types.
    pub async fn get_client_parcels(&self, client: ClientId) -> Result<Vec<Parcel>, ServiceError> {
        let rows = self.store.query_by_client(client).await?;

        let parcels = rows
            .into_iter()
            .map(row_to_parcel)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(client = %client, count = parcels.len(), "client parcels loaded");
        Ok(parcels)
    }

    /// Move a parcel to `sent` or `delivered`.
    ///
    /// Ordering between `sent` and `delivered` is not enforced. A parcel that
    /// does not exist is reported as a precondition failure.
    pub async fn update_parcel_status(
        &self,
        number: ParcelNumber,
        status: ParcelStatus,
    ) -> Result<(), ServiceError> {
        let status = status.ensure_update_target()?;

        let affected = self.store.update_status(number, status).await?;
        if affected == 0 {
            tracing::warn!(parcel.number = %number, %status, "status update matched no parcel");
            return Err(DomainError::precondition(format!("parcel {number} not found")).into());
        }

        tracing::info!(parcel.number = %number, %status, "parcel status updated");
        Ok(())
    }

    /// Change the delivery address while the parcel is still `registered`.
    pub async fn update_delivery_address(
        &self,
        number: ParcelNumber,
        address: &str,
    ) -> Result<(), ServiceError> {
        let address = DeliveryAddress::parse(address)?;

        let affected = self
            .store
            .update_address_if_status(number, address.as_str(), ParcelStatus::Registered)
            .await?;
        if affected == 0 {
            tracing::warn!(parcel.number = %number, "address change rejected");
            return Err(DomainError::precondition(format!(
                "cannot change address: parcel {number} is not registered or does not exist"
            ))
            .into());
        }

        tracing::info!(parcel.number = %number, "delivery address updated");
        Ok(())
    }

    /// Delete a parcel while it is still `registered`.
    pub async fn delete_parcel(&self, number: ParcelNumber) -> Result<(), ServiceError> {
        let affected = self
            .store
            .delete_if_status(number, ParcelStatus::Registered)
            .await?;
        if affected == 0 {
            tracing::warn!(parcel.number = %number, "delete rejected");
            return Err(DomainError::precondition(format!(
                "cannot delete: parcel {number} is not registered or does not exist"
            ))
            .into());
        }

        tracing::info!(parcel.number = %number, "parcel deleted");
        Ok(())
    }
}

/// RFC3339 with second precision and a `Z` suffix.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn row_to_parcel(row: ParcelRow) -> Result<Parcel, ParcelStoreError> {
    let number = row.number;
    let corrupt = |what: &str, detail: String| {
        ParcelStoreError::Corrupt(format!("parcel {number}: {what}: {detail}"))
    };

    let status = row
        .status
        .parse::<ParcelStatus>()
        .map_err(|e| corrupt("status", e.to_string()))?;
    let address = DeliveryAddress::from_stored(row.address);
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt("created_at", format!("'{}': {e}", row.created_at)))?;

    Ok(Parcel {
        number,
        client: row.client,
        status,
        address,
        created_at,
    })
}
