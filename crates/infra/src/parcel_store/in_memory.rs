use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use parceltrack_core::{ClientId, ParcelNumber};
use parceltrack_parcels::ParcelStatus;

use super::{NewParcelRow, ParcelRow, ParcelStore, ParcelStoreError};

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<ParcelNumber, ParcelRow>,
    last_number: i64,
}

/// In-memory parcel store for tests/dev.
///
/// Mirrors the SQLite table: numbers start at 1, grow monotonically and are
/// never handed out twice, even after a delete.
#[derive(Debug, Default)]
pub struct InMemoryParcelStore {
    inner: RwLock<Inner>,
}

impl InMemoryParcelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.read().expect("in-memory parcel store lock").rows.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> ParcelStoreError {
    ParcelStoreError::Storage("in-memory parcel store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ParcelStore for InMemoryParcelStore {
    async fn insert(&self, row: NewParcelRow) -> Result<ParcelNumber, ParcelStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.last_number += 1;
        let number = ParcelNumber::new(inner.last_number);

        inner.rows.insert(
            number,
            ParcelRow {
                number,
                client: row.client,
                status: row.status.as_str().to_string(),
                address: row.address,
                created_at: row.created_at,
            },
        );
        Ok(number)
    }

    async fn query_by_client(&self, client: ClientId) -> Result<Vec<ParcelRow>, ParcelStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .rows
            .values()
            .filter(|r| r.client == client)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        number: ParcelNumber,
        status: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        match inner.rows.get_mut(&number) {
            Some(row) => {
                row.status = status.as_str().to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_address_if_status(
        &self,
        number: ParcelNumber,
        address: &str,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        match inner.rows.get_mut(&number) {
            Some(row) if row.status == required.as_str() => {
                row.address = address.to_string();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_if_status(
        &self,
        number: ParcelNumber,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let matches = inner
            .rows
            .get(&number)
            .is_some_and(|row| row.status == required.as_str());
        if !matches {
            return Ok(0);
        }
        inner.rows.remove(&number);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_row(client: i64, address: &str) -> NewParcelRow {
        NewParcelRow {
            client: ClientId::new(client),
            status: ParcelStatus::Registered,
            address: address.to_string(),
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn numbering_starts_at_one_and_is_never_reused() {
        let store = InMemoryParcelStore::new();

        let first = store.insert(new_row(1, "A")).await.unwrap();
        assert_eq!(first, ParcelNumber::new(1));

        store
            .delete_if_status(first, ParcelStatus::Registered)
            .await
            .unwrap();
        let second = store.insert(new_row(1, "B")).await.unwrap();
        assert_eq!(second, ParcelNumber::new(2));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn guards_match_the_sqlite_semantics() {
        let store = InMemoryParcelStore::new();
        let number = store.insert(new_row(1, "A")).await.unwrap();

        store.update_status(number, ParcelStatus::Delivered).await.unwrap();
        assert_eq!(
            store
                .update_address_if_status(number, "B", ParcelStatus::Registered)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            store
                .delete_if_status(number, ParcelStatus::Registered)
                .await
                .unwrap(),
            0
        );

        let rows = store.query_by_client(ClientId::new(1)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "delivered");
        assert_eq!(rows[0].address, "A");
    }

    #[tokio::test]
    async fn shared_handle_sees_the_same_rows() {
        let store = InMemoryParcelStore::arc();
        let shared: Arc<InMemoryParcelStore> = store.clone();

        shared.insert(new_row(3, "A")).await.unwrap();

        assert_eq!(store.query_by_client(ClientId::new(3)).await.unwrap().len(), 1);
        assert!(store.query_by_client(ClientId::new(4)).await.unwrap().is_empty());
    }
}
