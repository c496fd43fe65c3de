//! # Inventory Store
//!
//! The seam between the checkout processor and wherever stock lives.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────┐
//! │  CheckoutProcessor   │──────► │  dyn InventoryStore          │
//! └──────────────────────┘        │  ├── MemoryInventory (here)  │
//!                                 │  └── InventoryRepository     │
//!                                 │      (basket-db, SQLite)     │
//!                                 └──────────────────────────────┘
//! ```
//!
//! ## Write Contract
//! `persist` is a compare-and-swap: it succeeds only while the stored
//! `version` still equals the version on the record passed in, and bumps the
//! stored version by one. A stale write reports [`StoreError::Conflict`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::types::{InventoryRecord, NewInventoryRecord};

/// Stock lookup and versioned writes.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Looks up a record by exact, case-sensitive name.
    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>, StoreError>;

    /// Writes one record's quantity if its version is still current.
    async fn persist(&self, record: &InventoryRecord) -> Result<(), StoreError>;

    /// Writes several records atomically. Either every write applies or none.
    async fn persist_all(&self, records: &[InventoryRecord]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: InventoryStore + ?Sized> InventoryStore for Arc<S> {
    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn persist(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        (**self).persist(record).await
    }

    async fn persist_all(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        (**self).persist_all(records).await
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local inventory, used by tests and demos.
///
/// Counts write calls so callers can assert that nothing was persisted.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    records: Mutex<HashMap<String, InventoryRecord>>,
    next_id: AtomicUsize,
    persist_calls: AtomicUsize,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `(name, quantity)` pairs, all priced at zero.
    pub fn seeded<'a>(items: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let store = Self::new();
        for (name, quantity) in items {
            store.insert(NewInventoryRecord {
                name: name.to_string(),
                quantity,
                unit_price_cents: 0,
            });
        }
        store
    }

    /// Adds or replaces a record, starting at version 0.
    pub fn insert(&self, new: NewInventoryRecord) -> InventoryRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let record = InventoryRecord {
            id,
            name: new.name,
            quantity: new.quantity,
            unit_price_cents: new.unit_price_cents,
            version: 0,
            updated_at: Utc::now(),
        };
        self.lock().insert(record.name.clone(), record.clone());
        record
    }

    /// Current state of a record, bypassing the store trait.
    pub fn get(&self, name: &str) -> Option<InventoryRecord> {
        self.lock().get(name).cloned()
    }

    /// Current quantity of a record.
    pub fn quantity_of(&self, name: &str) -> Option<i64> {
        self.get(name).map(|r| r.quantity)
    }

    /// Number of `persist` and `persist_all` calls so far, successful or not.
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, InventoryRecord>> {
        // A poisoned map is still structurally valid; every write is a single insert.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn check_version(
    records: &HashMap<String, InventoryRecord>,
    record: &InventoryRecord,
) -> Result<(), StoreError> {
    let current = records
        .get(&record.name)
        .ok_or_else(|| StoreError::NotFound(record.name.clone()))?;

    if current.version != record.version {
        return Err(StoreError::Conflict {
            name: record.name.clone(),
            expected_version: record.version,
        });
    }
    Ok(())
}

fn apply(records: &mut HashMap<String, InventoryRecord>, record: &InventoryRecord) {
    if let Some(current) = records.get_mut(&record.name) {
        current.quantity = record.quantity;
        current.version += 1;
        current.updated_at = Utc::now();
    }
}

#[async_trait]
impl InventoryStore for MemoryInventory {
    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self.get(name))
    }

    async fn persist(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.lock();
        check_version(&records, record)?;
        apply(&mut records, record);
        Ok(())
    }

    async fn persist_all(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.lock();
        for record in records {
            check_version(&stored, record)?;
        }
        for record in records {
            apply(&mut stored, record);
        }
        Ok(())
    }
}
