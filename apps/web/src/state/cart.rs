//! # Cart Sessions
//!
//! Holds each shopper's serialized cart between requests.
//!
//! ## Thread Safety
//! Each session sits behind its own `tokio::sync::Mutex`, so two requests
//! against the same cart (an add racing a confirm) run one after the other,
//! while different carts never wait on each other.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Session Lifecycle                               │
//! │                                                                         │
//! │  POST /carts ──────────────► create()      ──► { payload: None }       │
//! │                                                                         │
//! │  POST /carts/{id}/items ───► store_cart()  ──► { payload: "[...]" }    │
//! │                                                                         │
//! │  POST /carts/{id}/confirm ─► finish_checkout()                         │
//! │                                ├── success        ──► payload: None    │
//! │                                ├── partial commit ──► payload: None    │
//! │                                └── nothing written ─► payload kept     │
//! │                              flash = status message                    │
//! │                                                                         │
//! │  GET /carts/{id} ──────────► take_flash()  ──► flash: None             │
//! │                                                                         │
//! │  idle > BASKET_CART_IDLE_SECS ─► evicted by the cache                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use basket_core::error::CoreResult;
use basket_core::{Cart, CheckoutFailure, CheckoutOutcome, CheckoutReceipt};

/// One shopper's transient state.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    /// Serialized cart lines; `None` when the cart is empty.
    pub payload: Option<String>,

    /// One-shot status message for the next cart view.
    pub flash: Option<String>,
}

impl CartSession {
    /// Decodes the stored payload. No payload is an empty cart.
    pub fn cart(&self) -> CoreResult<Cart> {
        match &self.payload {
            Some(payload) => Cart::from_payload(payload),
            None => Ok(Cart::new()),
        }
    }

    /// Replaces the stored payload with `cart`.
    pub fn store_cart(&mut self, cart: &Cart) -> CoreResult<()> {
        self.payload = if cart.is_empty() {
            None
        } else {
            Some(cart.to_payload()?)
        };
        Ok(())
    }

    /// Returns and clears the pending status message.
    pub fn take_flash(&mut self) -> Option<String> {
        self.flash.take()
    }

    /// Applies a checkout result to the session.
    ///
    /// The payload is dropped once any stock was decremented, so confirming
    /// the same cart again cannot decrement twice.
    pub fn finish_checkout(
        &mut self,
        result: &Result<CheckoutReceipt, CheckoutFailure>,
    ) -> CheckoutOutcome {
        let outcome = CheckoutOutcome::from_result(result);

        let consume = match result {
            Ok(_) => true,
            Err(failure) => failure.has_committed_changes(),
        };
        if consume {
            self.payload = None;
        }

        self.flash = outcome.status_message.clone();
        outcome
    }
}

/// Shared handle to a session.
pub type SessionHandle = Arc<Mutex<CartSession>>;

/// All live cart sessions, keyed by cart id.
#[derive(Clone)]
pub struct CartSessions {
    cache: Cache<Uuid, SessionHandle>,
}

impl CartSessions {
    pub fn new(idle: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .build();

        CartSessions { cache }
    }

    /// Starts an empty session and returns its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.cache
            .insert(id, Arc::new(Mutex::new(CartSession::default())))
            .await;
        id
    }

    /// Looks up a live session.
    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.cache.get(id).await
    }

    /// Looks up a session, starting an empty one under `id` if none is live.
    pub async fn get_or_create(&self, id: Uuid) -> SessionHandle {
        self.cache
            .get_with(id, async { Arc::new(Mutex::new(CartSession::default())) })
            .await
    }

    /// Drops a session.
    pub async fn remove(&self, id: &Uuid) {
        self.cache.invalidate(id).await;
    }
}
