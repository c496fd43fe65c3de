//! # Inventory Repository
//!
//! Database operations for stock records.
//!
//! ## Key Operations
//! - Lookup by exact name
//! - Versioned quantity writes (single and transactional batch)
//! - Listing and creation for the inventory screen and seeding
//!
//! ## Compare-and-Swap Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why Writes Carry a Version                           │
//! │                                                                         │
//! │  Checkout A reads Widget (qty 10, v3)                                  │
//! │  Checkout B reads Widget (qty 10, v3)                                  │
//! │                                                                         │
//! │  A: UPDATE ... SET quantity = 4, version = 4                           │
//! │        WHERE name = 'Widget' AND version = 3   → 1 row  ✓              │
//! │                                                                         │
//! │  B: UPDATE ... SET quantity = 4, version = 4                           │
//! │        WHERE name = 'Widget' AND version = 3   → 0 rows ✗ Conflict     │
//! │                                                                         │
//! │  B re-reads (qty 4, v4) and re-validates instead of overwriting.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use basket_core::{InventoryRecord, InventoryStore, NewInventoryRecord, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, name, quantity, unit_price_cents, version, updated_at FROM inventory";

/// Repository for inventory database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InventoryRepository::new(pool);
///
/// let widget = repo.find_by_name("Widget").await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets a record by its exact, case-sensitive name.
    ///
    /// ## Returns
    /// * `Ok(Some(InventoryRecord))` - Record found
    /// * `Ok(None)` - No record carries this name
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<InventoryRecord>> {
        // SQLite's default BINARY collation compares case-sensitively.
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} WHERE name = ?1",
            SELECT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets a record by row id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<InventoryRecord>> {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} WHERE id = ?1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists all records ordered by name.
    pub async fn list(&self) -> DbResult<Vec<InventoryRecord>> {
        let records = sqlx::query_as::<_, InventoryRecord>(&format!(
            "{} ORDER BY name",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Listed inventory");
        Ok(records)
    }

    /// Inserts a new record at version 0.
    ///
    /// ## Returns
    /// * `Ok(InventoryRecord)` - Inserted record with its generated id
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, new: &NewInventoryRecord) -> DbResult<InventoryRecord> {
        debug!(name = %new.name, quantity = new.quantity, "Inserting inventory record");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO inventory (name, quantity, unit_price_cents, version, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(&new.name)
        .bind(new.quantity)
        .bind(new.unit_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &new.name),
            other => other,
        })?;

        Ok(InventoryRecord {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            quantity: new.quantity,
            unit_price_cents: new.unit_price_cents,
            version: 0,
            updated_at: now,
        })
    }

    /// Writes a record's quantity if its version is still current.
    ///
    /// ## Returns
    /// * `Ok(())` - Written; the stored version is now `record.version + 1`
    /// * `Err(DbError::Conflict)` - Someone else wrote first
    /// * `Err(DbError::NotFound)` - No record with this name
    pub async fn persist(&self, record: &InventoryRecord) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        write_versioned(&mut tx, record).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Writes several records in one transaction.
    ///
    /// Any conflict or missing record rolls the whole batch back.
    pub async fn persist_all(&self, records: &[InventoryRecord]) -> DbResult<()> {
        debug!(count = records.len(), "Persisting inventory batch");

        let mut tx = self.pool.begin().await?;
        for record in records {
            // Dropping `tx` on error rolls back.
            write_versioned(&mut tx, record).await?;
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Counts inventory records (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// One compare-and-swap update inside an open transaction.
async fn write_versioned(
    tx: &mut Transaction<'_, Sqlite>,
    record: &InventoryRecord,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE inventory
        SET
            quantity = ?1,
            version = version + 1,
            updated_at = ?2
        WHERE name = ?3 AND version = ?4
        "#,
    )
    .bind(record.quantity)
    .bind(Utc::now())
    .bind(&record.name)
    .bind(record.version)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 1 {
        debug!(
            name = %record.name,
            quantity = record.quantity,
            version = record.version + 1,
            "Inventory record written"
        );
        return Ok(());
    }

    // Zero rows: either the version moved on or the row is gone.
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM inventory WHERE name = ?1")
        .bind(&record.name)
        .fetch_optional(&mut **tx)
        .await?;

    match exists {
        Some(_) => Err(DbError::Conflict {
            entity: "Inventory".to_string(),
            id: record.name.clone(),
            expected_version: record.version,
        }),
        None => Err(DbError::not_found("Inventory", &record.name)),
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(InventoryRepository::find_by_name(self, name).await?)
    }

    async fn persist(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        Ok(InventoryRepository::persist(self, record).await?)
    }

    async fn persist_all(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        Ok(InventoryRepository::persist_all(self, records).await?)
    }
}
