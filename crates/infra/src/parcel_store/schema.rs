//! `parcel` table bootstrap.

use sqlx::SqlitePool;

use super::ParcelStoreError;

/// `AUTOINCREMENT` keeps SQLite from handing out the number of a deleted row again.
const CREATE_PARCEL_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS parcel (
        number     INTEGER PRIMARY KEY AUTOINCREMENT,
        client     INTEGER NOT NULL,
        status     TEXT NOT NULL,
        address    TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
"#;

const CREATE_CLIENT_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS parcel_client_idx ON parcel (client)
"#;

/// Create the `parcel` table if it does not exist. Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), ParcelStoreError> {
    sqlx::query(CREATE_PARCEL_TABLE)
        .execute(pool)
        .await
        .map_err(|e| ParcelStoreError::Storage(format!("failed to create parcel table: {e}")))?;

    sqlx::query(CREATE_CLIENT_INDEX)
        .execute(pool)
        .await
        .map_err(|e| ParcelStoreError::Storage(format!("failed to create parcel index: {e}")))?;

    tracing::debug!("parcel schema ready");
    Ok(())
}
