//! # Checkout Processor
//!
//! Turns a confirmed cart into stock decrements.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  payload ──► present? ──no──► CartMissing                              │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │            decode + validate every line ──fail──► UnexpectedFailure    │
//! │                 │                                                       │
//! │                 ▼   for each line, in cart order                        │
//! │   ┌──────────────────────────────────────────────────────────────┐     │
//! │   │  find_by_name ──none──► ItemNotFound(name)                   │     │
//! │   │       │                                                      │     │
//! │   │       ▼                                                      │     │
//! │   │  on_hand - qty < 0 ───► InsufficientStock(name)              │     │
//! │   │       │                                                      │     │
//! │   │       ▼                                                      │     │
//! │   │  persist (version CAS) ──conflict──► re-read, re-validate    │     │
//! │   └──────────────────────────────────────────────────────────────┘     │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │            CheckoutReceipt ──► redirect to cart view                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commit Policies
//! - [`CommitPolicy::PerItem`]: each line is written as soon as it passes.
//!   A later failure leaves earlier lines committed; they are reported in
//!   [`CheckoutFailure::applied`].
//! - [`CommitPolicy::AllOrNothing`]: every line is checked against a working
//!   copy first, then all records are written in one atomic call.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cart::decode_payload;
use crate::error::{CheckoutError, StoreError};
use crate::inventory::InventoryStore;
use crate::types::{CartLineItem, InventoryRecord, StockChange};
use crate::validation::validate_line;
use crate::DEFAULT_MAX_CONFLICT_RETRIES;

// =============================================================================
// Commit Policy
// =============================================================================

/// How decrements of one checkout reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Write each line immediately; earlier writes survive a later failure.
    #[default]
    PerItem,
    /// Validate everything, then write all records in one transaction.
    AllOrNothing,
}

impl CommitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitPolicy::PerItem => "per_item",
            CommitPolicy::AllOrNothing => "all_or_nothing",
        }
    }
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_item" => Ok(CommitPolicy::PerItem),
            "all_or_nothing" => Ok(CommitPolicy::AllOrNothing),
            other => Err(format!(
                "unknown commit policy '{}' (expected per_item or all_or_nothing)",
                other
            )),
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    /// One entry per cart line, in cart order.
    pub changes: Vec<StockChange>,
    pub policy: CommitPolicy,
    pub completed_at: DateTime<Utc>,
}

/// A checkout that stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct CheckoutFailure {
    pub error: CheckoutError,

    /// Decrements already committed before the failure. Always empty under
    /// [`CommitPolicy::AllOrNothing`].
    pub applied: Vec<StockChange>,
}

impl CheckoutFailure {
    pub fn new(error: CheckoutError) -> Self {
        CheckoutFailure {
            error,
            applied: Vec::new(),
        }
    }

    /// True when some stock was already decremented by this run.
    pub fn has_committed_changes(&self) -> bool {
        !self.applied.is_empty()
    }
}

impl From<CheckoutError> for CheckoutFailure {
    fn from(error: CheckoutError) -> Self {
        CheckoutFailure::new(error)
    }
}

/// Where the shopper goes after a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavTarget {
    /// The cart view.
    CartIndex,
}

/// What the presentation layer needs from a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub redirect: NavTarget,
    pub status_message: Option<String>,
}

impl CheckoutOutcome {
    pub fn from_result(result: &Result<CheckoutReceipt, CheckoutFailure>) -> Self {
        CheckoutOutcome {
            redirect: NavTarget::CartIndex,
            status_message: result.as_ref().err().map(|f| f.error.user_message()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_message.is_none()
    }
}

// =============================================================================
// Processor
// =============================================================================

/// Validates a cart against inventory and decrements stock.
///
/// ## Example
/// ```rust
/// use basket_core::{CheckoutProcessor, CommitPolicy, MemoryInventory};
///
/// let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]))
///     .with_policy(CommitPolicy::AllOrNothing)
///     .with_max_conflict_retries(5);
/// assert_eq!(processor.policy(), CommitPolicy::AllOrNothing);
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutProcessor<S> {
    store: S,
    policy: CommitPolicy,
    max_conflict_retries: u32,
}

impl<S: InventoryStore> CheckoutProcessor<S> {
    pub fn new(store: S) -> Self {
        CheckoutProcessor {
            store,
            policy: CommitPolicy::default(),
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how many times a version conflict triggers a re-read before
    /// the checkout gives up.
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Confirms a serialized cart.
    ///
    /// An absent or blank payload is [`CheckoutError::CartMissing`]; one that
    /// does not decode, or carries an invalid line, is
    /// [`CheckoutError::UnexpectedFailure`]. Neither touches inventory.
    pub async fn confirm_payload(
        &self,
        payload: Option<&str>,
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        let payload = match payload.map(str::trim) {
            None | Some("") => {
                return Err(self.fail(CheckoutFailure::new(CheckoutError::CartMissing)));
            }
            Some(p) => p,
        };

        let lines = decode_payload(payload)
            .map_err(|e| self.fail(CheckoutFailure::new(e.into())))?;

        self.confirm(&lines).await
    }

    /// Confirms already-decoded cart lines.
    pub async fn confirm(
        &self,
        lines: &[CartLineItem],
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        if lines.is_empty() {
            return Err(self.fail(CheckoutFailure::new(CheckoutError::CartMissing)));
        }

        for line in lines {
            if let Err(e) = validate_line(line) {
                return Err(self.fail(CheckoutFailure::new(CheckoutError::UnexpectedFailure(
                    format!("invalid cart line {}: {}", line.item_name, e),
                ))));
            }
        }

        debug!(lines = lines.len(), policy = %self.policy, "Starting checkout");

        let result = match self.policy {
            CommitPolicy::PerItem => self.commit_per_item(lines).await,
            CommitPolicy::AllOrNothing => self.commit_all_or_nothing(lines).await,
        };

        match result {
            Ok(changes) => {
                info!(lines = changes.len(), policy = %self.policy, "Checkout completed");
                Ok(CheckoutReceipt {
                    changes,
                    policy: self.policy,
                    completed_at: Utc::now(),
                })
            }
            Err(failure) => Err(self.fail(failure)),
        }
    }

    // =========================================================================
    // Per-item commit
    // =========================================================================

    async fn commit_per_item(
        &self,
        lines: &[CartLineItem],
    ) -> Result<Vec<StockChange>, CheckoutFailure> {
        let mut applied = Vec::with_capacity(lines.len());

        for line in lines {
            match self.decrement_line(line).await {
                Ok(change) => applied.push(change),
                Err(error) => return Err(CheckoutFailure { error, applied }),
            }
        }

        Ok(applied)
    }

    async fn decrement_line(&self, line: &CartLineItem) -> Result<StockChange, CheckoutError> {
        let mut attempt = 0;

        loop {
            let record = self.load(&line.item_name).await?;
            let remaining = remaining_after(&record, line)?;

            match self.store.persist(&record.with_quantity(remaining)).await {
                Ok(()) => {
                    info!(
                        item = %record.name,
                        from = record.quantity,
                        to = remaining,
                        "Stock decremented"
                    );
                    return Ok(StockChange {
                        item_name: record.name,
                        before: record.quantity,
                        after: remaining,
                    });
                }
                Err(StoreError::Conflict { .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    debug!(item = %record.name, attempt, "Version conflict, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // =========================================================================
    // All-or-nothing commit
    // =========================================================================

    async fn commit_all_or_nothing(
        &self,
        lines: &[CartLineItem],
    ) -> Result<Vec<StockChange>, CheckoutFailure> {
        let mut attempt = 0;

        loop {
            let (records, changes) = self.plan(lines).await?;

            match self.store.persist_all(&records).await {
                Ok(()) => {
                    for change in &changes {
                        info!(
                            item = %change.item_name,
                            from = change.before,
                            to = change.after,
                            "Stock decremented"
                        );
                    }
                    return Ok(changes);
                }
                Err(StoreError::Conflict { name, .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    debug!(item = %name, attempt, "Version conflict, re-validating cart");
                }
                Err(e) => return Err(CheckoutError::from(e).into()),
            }
        }
    }

    /// Applies every line to a working copy of the records it touches.
    ///
    /// Lines naming the same item see the running quantity, so
    /// `[Widget×3, Widget×3]` against 5 on hand fails on the second line.
    async fn plan(
        &self,
        lines: &[CartLineItem],
    ) -> Result<(Vec<InventoryRecord>, Vec<StockChange>), CheckoutError> {
        let mut working: Vec<InventoryRecord> = Vec::new();
        let mut changes = Vec::with_capacity(lines.len());

        for line in lines {
            let index = match working.iter().position(|r| r.name == line.item_name) {
                Some(index) => index,
                None => {
                    working.push(self.load(&line.item_name).await?);
                    working.len() - 1
                }
            };

            let record = &mut working[index];
            let remaining = remaining_after(record, line)?;
            changes.push(StockChange {
                item_name: record.name.clone(),
                before: record.quantity,
                after: remaining,
            });
            record.quantity = remaining;
        }

        Ok((working, changes))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load(&self, name: &str) -> Result<InventoryRecord, CheckoutError> {
        self.store
            .find_by_name(name)
            .await?
            .ok_or_else(|| CheckoutError::ItemNotFound(name.to_string()))
    }

    fn fail(&self, failure: CheckoutFailure) -> CheckoutFailure {
        match &failure.error {
            CheckoutError::UnexpectedFailure(detail) => {
                error!(detail = %detail, applied = failure.applied.len(), "Checkout failed");
            }
            other => {
                warn!(reason = %other, applied = failure.applied.len(), "Checkout rejected");
            }
        }
        failure
    }
}

fn remaining_after(record: &InventoryRecord, line: &CartLineItem) -> Result<i64, CheckoutError> {
    let remaining = record.quantity - line.quantity;
    if remaining < 0 {
        return Err(CheckoutError::InsufficientStock {
            item_name: line.item_name.clone(),
            available: record.quantity,
            requested: line.quantity,
        });
    }
    Ok(remaining)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::inventory::MemoryInventory;
    use crate::money::Money;

    fn line(name: &str, quantity: i64) -> CartLineItem {
        CartLineItem::new("u-1", name, Money::zero(), quantity)
    }

    fn payload(lines: &[CartLineItem]) -> String {
        serde_json::to_string(lines).unwrap()
    }

    /// Yields to the scheduler after every read so two checkouts interleave
    /// between their read and their write.
    struct YieldingStore(Arc<MemoryInventory>);

    #[async_trait]
    impl InventoryStore for YieldingStore {
        async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>, StoreError> {
            let found = self.0.find_by_name(name).await;
            tokio::task::yield_now().await;
            found
        }

        async fn persist(&self, record: &InventoryRecord) -> Result<(), StoreError> {
            self.0.persist(record).await
        }

        async fn persist_all(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
            self.0.persist_all(records).await
        }
    }

    /// Reads succeed, every write conflicts.
    struct AlwaysConflicts {
        inner: MemoryInventory,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl InventoryStore for AlwaysConflicts {
        async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>, StoreError> {
            self.inner.find_by_name(name).await
        }

        async fn persist(&self, record: &InventoryRecord) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Conflict {
                name: record.name.clone(),
                expected_version: record.version,
            })
        }

        async fn persist_all(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Conflict {
                name: records[0].name.clone(),
                expected_version: records[0].version,
            })
        }
    }

    /// Every call fails as a broken backend would.
    struct BrokenStore;

    #[async_trait]
    impl InventoryStore for BrokenStore {
        async fn find_by_name(&self, _name: &str) -> Result<Option<InventoryRecord>, StoreError> {
            Err(StoreError::Backend("database is locked".to_string()))
        }

        async fn persist(&self, _record: &InventoryRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend("database is locked".to_string()))
        }

        async fn persist_all(&self, _records: &[InventoryRecord]) -> Result<(), StoreError> {
            Err(StoreError::Backend("database is locked".to_string()))
        }
    }

    // -------------------------------------------------------------------------
    // Per-item policy
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_single_item_success() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]));

        let receipt = processor
            .confirm_payload(Some(&payload(&[line("Widget", 3)])))
            .await
            .unwrap();

        assert_eq!(processor.store().quantity_of("Widget"), Some(7));
        assert_eq!(
            receipt.changes,
            vec![StockChange {
                item_name: "Widget".to_string(),
                before: 10,
                after: 7,
            }]
        );
        assert_eq!(receipt.policy, CommitPolicy::PerItem);
    }

    #[tokio::test]
    async fn test_exact_quantity_drains_to_zero() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 4)]));

        processor.confirm(&[line("Widget", 4)]).await.unwrap();

        assert_eq!(processor.store().quantity_of("Widget"), Some(0));
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_record_unchanged() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 2)]));

        let failure = processor.confirm(&[line("Widget", 5)]).await.unwrap_err();

        assert_eq!(
            failure.error,
            CheckoutError::InsufficientStock {
                item_name: "Widget".to_string(),
                available: 2,
                requested: 5,
            }
        );
        assert!(failure.applied.is_empty());
        assert_eq!(processor.store().quantity_of("Widget"), Some(2));
        assert_eq!(processor.store().persist_calls(), 0);
    }

    #[tokio::test]
    async fn test_item_not_found_stops_processing() {
        let processor =
            CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10), ("Gadget", 5)]));

        let failure = processor
            .confirm(&[line("Widget", 1), line("Gizmo", 1), line("Gadget", 1)])
            .await
            .unwrap_err();

        assert_eq!(failure.error, CheckoutError::ItemNotFound("Gizmo".to_string()));
        assert_eq!(failure.applied.len(), 1);
        assert_eq!(processor.store().quantity_of("Widget"), Some(9));
        assert_eq!(processor.store().quantity_of("Gadget"), Some(5));
    }

    #[tokio::test]
    async fn test_name_lookup_is_case_sensitive() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]));

        let failure = processor.confirm(&[line("widget", 1)]).await.unwrap_err();

        assert_eq!(failure.error, CheckoutError::ItemNotFound("widget".to_string()));
    }

    #[tokio::test]
    async fn test_per_item_keeps_earlier_decrements() {
        let processor =
            CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10), ("Gadget", 1)]));

        let failure = processor
            .confirm(&[line("Widget", 3), line("Gadget", 5)])
            .await
            .unwrap_err();

        assert!(matches!(
            &failure.error,
            CheckoutError::InsufficientStock { item_name, .. } if item_name == "Gadget"
        ));
        assert!(failure.has_committed_changes());
        assert_eq!(failure.applied[0].after, 7);
        assert_eq!(processor.store().quantity_of("Widget"), Some(7));
        assert_eq!(processor.store().quantity_of("Gadget"), Some(1));
    }

    #[tokio::test]
    async fn test_duplicate_lines_decrement_twice() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]));

        processor
            .confirm(&[line("Widget", 3), line("Widget", 4)])
            .await
            .unwrap();

        assert_eq!(processor.store().quantity_of("Widget"), Some(3));
    }

    // -------------------------------------------------------------------------
    // Missing and malformed payloads
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_missing_payload_is_cart_missing() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]));

        for input in [None, Some(""), Some("   "), Some("[]")] {
            let failure = processor.confirm_payload(input).await.unwrap_err();
            assert_eq!(failure.error, CheckoutError::CartMissing);
        }
        assert_eq!(processor.store().persist_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_unexpected_failure() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]));

        for input in ["{not json", r#"{"ItemName":"Widget"}"#, r#"[{"Quantity":1}]"#] {
            let failure = processor.confirm_payload(Some(input)).await.unwrap_err();
            assert!(matches!(failure.error, CheckoutError::UnexpectedFailure(_)));
        }
        assert_eq!(processor.store().persist_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_line_rejected_before_any_write() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10)]));

        let failure = processor
            .confirm(&[line("Widget", 2), line("Widget", -1)])
            .await
            .unwrap_err();

        assert!(matches!(failure.error, CheckoutError::UnexpectedFailure(_)));
        assert_eq!(processor.store().persist_calls(), 0);
        assert_eq!(processor.store().quantity_of("Widget"), Some(10));
    }

    #[tokio::test]
    async fn test_quantity_above_cart_cap_still_checks_out() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 5000)]));

        let receipt = processor
            .confirm_payload(Some(r#"[{"ItemName":"Widget","Quantity":1000}]"#))
            .await
            .unwrap();

        assert_eq!(receipt.changes[0].after, 4000);
        assert_eq!(processor.store().quantity_of("Widget"), Some(4000));
    }

    #[tokio::test]
    async fn test_backend_failure_is_unexpected() {
        let processor = CheckoutProcessor::new(BrokenStore);

        let failure = processor.confirm(&[line("Widget", 1)]).await.unwrap_err();

        assert!(matches!(failure.error, CheckoutError::UnexpectedFailure(_)));
        assert_eq!(
            failure.error.user_message(),
            "An error occurred while processing your request."
        );
    }

    // -------------------------------------------------------------------------
    // All-or-nothing policy
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_all_or_nothing_leaves_inventory_untouched() {
        let processor =
            CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10), ("Gadget", 1)]))
                .with_policy(CommitPolicy::AllOrNothing);

        let failure = processor
            .confirm(&[line("Widget", 3), line("Gadget", 5)])
            .await
            .unwrap_err();

        assert!(matches!(failure.error, CheckoutError::InsufficientStock { .. }));
        assert!(failure.applied.is_empty());
        assert_eq!(processor.store().quantity_of("Widget"), Some(10));
        assert_eq!(processor.store().persist_calls(), 0);
    }

    #[tokio::test]
    async fn test_all_or_nothing_success_writes_once() {
        let processor =
            CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 10), ("Gadget", 5)]))
                .with_policy(CommitPolicy::AllOrNothing);

        let receipt = processor
            .confirm(&[line("Widget", 3), line("Gadget", 5)])
            .await
            .unwrap();

        assert_eq!(receipt.changes.len(), 2);
        assert_eq!(processor.store().quantity_of("Widget"), Some(7));
        assert_eq!(processor.store().quantity_of("Gadget"), Some(0));
        assert_eq!(processor.store().persist_calls(), 1);
    }

    #[tokio::test]
    async fn test_all_or_nothing_sees_running_quantity() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 5)]))
            .with_policy(CommitPolicy::AllOrNothing);

        let failure = processor
            .confirm(&[line("Widget", 3), line("Widget", 3)])
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            CheckoutError::InsufficientStock {
                item_name: "Widget".to_string(),
                available: 2,
                requested: 3,
            }
        );
        assert_eq!(processor.store().quantity_of("Widget"), Some(5));
    }

    // -------------------------------------------------------------------------
    // Concurrency
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_concurrent_checkouts_cannot_oversell() {
        let inventory = Arc::new(MemoryInventory::seeded([("Widget", 10)]));
        let first = CheckoutProcessor::new(YieldingStore(inventory.clone()));
        let second = CheckoutProcessor::new(YieldingStore(inventory.clone()));
        let cart = [line("Widget", 6)];

        let (a, b) = tokio::join!(first.confirm(&cart), second.confirm(&cart));

        let outcomes = [a, b];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let insufficient = outcomes
            .iter()
            .filter(|r| {
                matches!(r, Err(f) if matches!(f.error, CheckoutError::InsufficientStock { .. }))
            })
            .count();

        assert_eq!(successes, 1);
        assert_eq!(insufficient, 1);
        assert_eq!(inventory.quantity_of("Widget"), Some(4));
    }

    #[tokio::test]
    async fn test_concurrent_all_or_nothing_cannot_oversell() {
        let inventory = Arc::new(MemoryInventory::seeded([("Widget", 10)]));
        let first = CheckoutProcessor::new(YieldingStore(inventory.clone()))
            .with_policy(CommitPolicy::AllOrNothing);
        let second = CheckoutProcessor::new(YieldingStore(inventory.clone()))
            .with_policy(CommitPolicy::AllOrNothing);
        let cart = [line("Widget", 6)];

        let (a, b) = tokio::join!(first.confirm(&cart), second.confirm(&cart));

        assert_eq!([&a, &b].iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(inventory.quantity_of("Widget"), Some(4));
    }

    #[tokio::test]
    async fn test_conflict_retries_are_bounded() {
        let store = AlwaysConflicts {
            inner: MemoryInventory::seeded([("Widget", 10)]),
            writes: AtomicUsize::new(0),
        };
        let processor = CheckoutProcessor::new(store).with_max_conflict_retries(2);

        let failure = processor.confirm(&[line("Widget", 1)]).await.unwrap_err();

        assert!(matches!(failure.error, CheckoutError::UnexpectedFailure(_)));
        assert_eq!(processor.store().writes.load(Ordering::SeqCst), 3);
    }

    // -------------------------------------------------------------------------
    // Outcome
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_outcome_messages() {
        let processor = CheckoutProcessor::new(MemoryInventory::seeded([("Widget", 2)]));

        let ok = processor.confirm(&[line("Widget", 1)]).await;
        let outcome = CheckoutOutcome::from_result(&ok);
        assert!(outcome.is_success());
        assert_eq!(outcome.redirect, NavTarget::CartIndex);

        let err = processor.confirm(&[line("Widget", 5)]).await;
        let outcome = CheckoutOutcome::from_result(&err);
        assert_eq!(outcome.redirect, NavTarget::CartIndex);
        assert_eq!(
            outcome.status_message.as_deref(),
            Some("Not enough stock for Widget.")
        );
    }

    #[test]
    fn test_commit_policy_parsing() {
        assert_eq!("per_item".parse::<CommitPolicy>().unwrap(), CommitPolicy::PerItem);
        assert_eq!(
            "All-Or-Nothing".parse::<CommitPolicy>().unwrap(),
            CommitPolicy::AllOrNothing
        );
        assert!("eventually".parse::<CommitPolicy>().is_err());
        assert_eq!(CommitPolicy::AllOrNothing.to_string(), "all_or_nothing");
    }
}
