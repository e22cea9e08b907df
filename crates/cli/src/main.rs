//! `parceltrack` demo driver.
//!
//! Registers a parcel, lists the client's parcels, ships it, then shows that
//! address changes and deletion are refused once a parcel has left.

use std::io::Write;

use anyhow::Context;

use parceltrack_core::ClientId;
use parceltrack_infra::{ParcelService, ParcelStore, ServiceError, SqliteParcelStore, TrackerConfig};
use parceltrack_parcels::ParcelStatus;

const DEMO_CLIENT: ClientId = ClientId::new(1);
const DEMO_ADDRESS: &str = "1 Example Street";
const DEMO_NEW_ADDRESS: &str = "2 New Address Avenue";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parceltrack_observability::init();

    let config = TrackerConfig::from_env();
    let store = SqliteParcelStore::connect(&config)
        .await
        .with_context(|| format!("failed to open parcel store at {}", config.database_url))?;

    let service = ParcelService::new(store);
    let stdout = std::io::stdout();
    let result = run_demo(&service, &mut stdout.lock()).await;

    service.into_store().close().await;
    result
}

/// Outcome of an operation that is allowed to be refused.
fn refused_or_fail(result: Result<(), ServiceError>, action: &str) -> anyhow::Result<bool> {
    match result {
        Ok(()) => Ok(false),
        Err(err) if err.is_precondition() => {
            tracing::warn!(error = %err, "{action} refused (expected once the parcel has shipped)");
            Ok(true)
        }
        Err(err) => Err(err).with_context(|| format!("{action} failed")),
    }
}

async fn run_demo<S, W>(service: &ParcelService<S>, out: &mut W) -> anyhow::Result<()>
where
    S: ParcelStore,
    W: Write,
{
    let number = service
        .register_parcel(DEMO_CLIENT, DEMO_ADDRESS)
        .await
        .context("failed to register parcel")?;
    tracing::info!(parcel.number = %number, "demo parcel registered");

    let parcels = service
        .get_client_parcels(DEMO_CLIENT)
        .await
        .context("failed to list client parcels")?;
    for parcel in &parcels {
        let line = serde_json::to_string(parcel).context("failed to serialize parcel")?;
        writeln!(out, "{line}").context("failed to write parcel listing")?;
    }

    service
        .update_parcel_status(number, ParcelStatus::Sent)
        .await
        .context("failed to mark parcel as sent")?;

    let refused = refused_or_fail(
        service.update_delivery_address(number, DEMO_NEW_ADDRESS).await,
        "address change",
    )?;
    if !refused {
        anyhow::bail!("address change of shipped parcel {number} was accepted");
    }

    let refused = refused_or_fail(service.delete_parcel(number).await, "delete")?;
    if !refused {
        anyhow::bail!("delete of shipped parcel {number} was accepted");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use parceltrack_core::ParcelNumber;
    use parceltrack_infra::{InMemoryParcelStore, NewParcelRow, ParcelRow, ParcelStoreError};

    use super::*;

    /// Store whose guarded statements always report a changed row.
    struct IgnoresStatusGuard(InMemoryParcelStore);

    #[async_trait::async_trait]
    impl ParcelStore for IgnoresStatusGuard {
        async fn insert(&self, row: NewParcelRow) -> Result<ParcelNumber, ParcelStoreError> {
            self.0.insert(row).await
        }

        async fn query_by_client(&self, client: ClientId) -> Result<Vec<ParcelRow>, ParcelStoreError> {
            self.0.query_by_client(client).await
        }

        async fn update_status(
            &self,
            number: ParcelNumber,
            status: ParcelStatus,
        ) -> Result<u64, ParcelStoreError> {
            self.0.update_status(number, status).await
        }

        async fn update_address_if_status(
            &self,
            _number: ParcelNumber,
            _address: &str,
            _required: ParcelStatus,
        ) -> Result<u64, ParcelStoreError> {
            Ok(1)
        }

        async fn delete_if_status(
            &self,
            _number: ParcelNumber,
            _required: ParcelStatus,
        ) -> Result<u64, ParcelStoreError> {
            Ok(1)
        }
    }

    #[tokio::test]
    async fn demo_fails_when_a_shipped_parcel_is_modified() {
        let service = ParcelService::new(IgnoresStatusGuard(InMemoryParcelStore::new()));
        let mut out = Vec::new();

        let err = run_demo(&service, &mut out).await.unwrap_err();
        assert!(err.to_string().contains("address change of shipped parcel"));
    }

    #[tokio::test]
    async fn demo_prints_registered_parcel_and_leaves_it_sent() {
        let service = ParcelService::new(InMemoryParcelStore::arc());
        let mut out = Vec::new();

        run_demo(&service, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let listed: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(listed["status"], "registered");
        assert_eq!(listed["address"], DEMO_ADDRESS);
        assert_eq!(listed["client"], 1);

        let parcels = service.get_client_parcels(DEMO_CLIENT).await.unwrap();
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].status, ParcelStatus::Sent);
        assert_eq!(parcels[0].address.as_str(), DEMO_ADDRESS);
    }

    #[test]
    fn only_preconditions_count_as_expected_refusals() {
        assert!(!refused_or_fail(Ok(()), "delete").unwrap());
        assert!(
            refused_or_fail(Err(ServiceError::Precondition("shipped".into())), "delete").unwrap()
        );
        assert!(refused_or_fail(Err(ServiceError::Validation("empty".into())), "delete").is_err());
    }
}
