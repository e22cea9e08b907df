//! SQLite-backed parcel store.

use core::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::Instrument;

use parceltrack_core::{ClientId, ParcelNumber};
use parceltrack_parcels::ParcelStatus;

use super::schema::ensure_schema;
use super::{NewParcelRow, ParcelRow, ParcelStore, ParcelStoreError};
use crate::config::TrackerConfig;

/// Parcel store over a SQLite connection pool.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone; the store owns its pool and
/// nothing else reaches the `parcel` table.
#[derive(Debug, Clone)]
pub struct SqliteParcelStore {
    pool: SqlitePool,
}

impl SqliteParcelStore {
    /// Open a pool for `config` and make sure the `parcel` table exists.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, ParcelStoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

        let mut pool_options =
            SqlitePoolOptions::new().max_connections(config.effective_max_connections());
        if config.is_in_memory() {
            // Dropping the last connection would drop the database with it.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            ParcelStoreError::Storage(format!(
                "failed to open SQLite database at {}: {e}",
                config.database_url
            ))
        })?;

        ensure_schema(&pool).await?;

        tracing::info!(
            database_url = %config.database_url,
            max_connections = config.effective_max_connections(),
            "parcel store connected"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &SqliteRow) -> Result<ParcelRow, ParcelStoreError> {
    let corrupt = |e: sqlx::Error| ParcelStoreError::Corrupt(e.to_string());

    Ok(ParcelRow {
        number: ParcelNumber::new(row.try_get::<i64, _>("number").map_err(corrupt)?),
        client: ClientId::new(row.try_get::<i64, _>("client").map_err(corrupt)?),
        status: row.try_get("status").map_err(corrupt)?,
        address: row.try_get("address").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
    })
}

#[async_trait::async_trait]
impl ParcelStore for SqliteParcelStore {
    async fn insert(&self, row: NewParcelRow) -> Result<ParcelNumber, ParcelStoreError> {
        let span = tracing::debug_span!("parcel.insert", client = %row.client);

        let result = sqlx::query(
            r#"
            INSERT INTO parcel (client, status, address, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(row.client.get())
        .bind(row.status.as_str())
        .bind(&row.address)
        .bind(&row.created_at)
        .execute(&self.pool)
        .instrument(span)
        .await?;

        Ok(ParcelNumber::new(result.last_insert_rowid()))
    }

    async fn query_by_client(&self, client: ClientId) -> Result<Vec<ParcelRow>, ParcelStoreError> {
        let span = tracing::debug_span!("parcel.query_by_client", client = %client);

        let rows = sqlx::query(
            r#"
            SELECT number, client, status, address, created_at
            FROM parcel
            WHERE client = ?1
            ORDER BY number
            "#,
        )
        .bind(client.get())
        .fetch_all(&self.pool)
        .instrument(span)
        .await?;

        rows.iter().map(decode_row).collect()
    }

    async fn update_status(
        &self,
        number: ParcelNumber,
        status: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        let span = tracing::debug_span!("parcel.update_status", parcel.number = %number, %status);

        let result = sqlx::query(
            r#"
            UPDATE parcel
            SET status = ?1
            WHERE number = ?2
            "#,
        )
        .bind(status.as_str())
        .bind(number.get())
        .execute(&self.pool)
        .instrument(span)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_address_if_status(
        &self,
        number: ParcelNumber,
        address: &str,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        let span = tracing::debug_span!(
            "parcel.update_address_if_status",
            parcel.number = %number,
            required = %required
        );

        let result = sqlx::query(
            r#"
            UPDATE parcel
            SET address = ?1
            WHERE number = ?2
              AND status = ?3
            "#,
        )
        .bind(address)
        .bind(number.get())
        .bind(required.as_str())
        .execute(&self.pool)
        .instrument(span)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_if_status(
        &self,
        number: ParcelNumber,
        required: ParcelStatus,
    ) -> Result<u64, ParcelStoreError> {
        let span = tracing::debug_span!(
            "parcel.delete_if_status",
            parcel.number = %number,
            required = %required
        );

        let result = sqlx::query(
            r#"
            DELETE FROM parcel
            WHERE number = ?1
              AND status = ?2
            "#,
        )
        .bind(number.get())
        .bind(required.as_str())
        .execute(&self.pool)
        .instrument(span)
        .await?;

        Ok(result.rows_affected())
    }
}
