use std::sync::Arc;

use thiserror::Error;

use parceltrack_core::{ClientId, ParcelNumber};
use parceltrack_parcels::ParcelStatus;

/// A parcel row ready to be inserted (number not yet assigned).
///
/// `created_at` is already formatted (RFC3339); the store persists it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParcelRow {
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    pub created_at: String,
}

/// A raw row as stored in the `parcel` table.
///
/// `status` and `created_at` are the stored text. Rows are interpreted (and may
/// turn out to be malformed) only when the service maps them to `Parcel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelRow {
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: String,
    pub address: String,
    pub created_at: String,
}

#[derive(Debug, Error)]
pub enum ParcelStoreError {
    /// The storage engine failed (I/O, constraint, driver).
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored row could not be deserialized.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for ParcelStoreError {
    fn from(value: sqlx::Error) -> Self {
        ParcelStoreError::Storage(value.to_string())
    }
}

/// Durable CRUD against the parcel table.
///
/// Every method maps to exactly one statement. The conditional variants put the
/// status guard in the same statement so concurrent callers are serialized by
/// the storage engine.
#[async_trait::async_trait]
pub trait ParcelStore: Send + Sync {
    /// Append a row and return the generated parcel number.
    async fn insert(&self, row: NewParcelRow) -> Result<ParcelNumber, ParcelStoreError>;

    /// All rows owned by `client`, ordered by number. Empty when none match.
    async fn query_by_client(&self, client: ClientId) -> Result<Vec<ParcelRow>, ParcelStoreError>;

    /// Unconditionally set the status. Returns rows affected.
    async fn update_status(
        &self,
        number: ParcelNumber,
        status: ParcelStatus,
    ) -> Result<u64, ParcelStoreError>;

    /// Set the address only if the row's current status is `required`.
    /// Returns rows affected.
    async fn update_address_if_status(
        &self,
        number: ParcelNumber,
        address: &str,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError>;

    /// Delete the row only if its current status is `required`.
    /// Returns rows affected.
    async fn delete_if_status(
        &self,
        number: ParcelNumber,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError>;
}

#[async_trait::async_trait]
impl<S> ParcelStore for Arc<S>
where
    S: ParcelStore + ?Sized,
{
    async fn insert(&self, row: NewParcelRow) -> Result<ParcelNumber, ParcelStoreError> {
        (**self).insert(row).await
    }

    async fn query_by_client(&self, client: ClientId) -> Result<Vec<ParcelRow>, ParcelStoreError> {
        (**self).query_by_client(client).await
    }

    async fn update_status(
        &self,
        number: ParcelNumber,
        status: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        (**self).update_status(number, status).await
    }

    async fn update_address_if_status(
        &self,
        number: ParcelNumber,
        address: &str,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        (**self).update_address_if_status(number, address, required).await
    }

    async fn delete_if_status(
        &self,
        number: ParcelNumber,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        (**self).delete_if_status(number, required).await
    }
}
