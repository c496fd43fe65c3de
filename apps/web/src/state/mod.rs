//! Application state shared across handlers.

pub mod cart;

use std::sync::Arc;

use basket_core::CheckoutProcessor;
use basket_db::{Database, InventoryRepository};

use crate::config::WebConfig;
pub use cart::{CartSession, CartSessions, SessionHandle};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    db: Database,
    carts: CartSessions,
}

impl AppState {
    pub fn new(config: WebConfig, db: Database) -> Self {
        let carts = CartSessions::new(config.cart_idle, config.cart_capacity);

        Self {
            inner: Arc::new(AppStateInner { config, db, carts }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    #[must_use]
    pub fn carts(&self) -> &CartSessions {
        &self.inner.carts
    }

    /// A checkout processor over the SQLite inventory, configured from
    /// [`WebConfig`].
    #[must_use]
    pub fn checkout(&self) -> CheckoutProcessor<InventoryRepository> {
        CheckoutProcessor::new(self.db().inventory())
            .with_policy(self.config().commit_policy)
            .with_max_conflict_retries(self.config().max_conflict_retries)
    }
}
