//! # Basket Web
//!
//! HTTP front end for the Basket checkout service.
//!
//! ## Module Organization
//! ```text
//! basket_web/
//! ├── lib.rs          ◄─── Router assembly, tracing, shutdown
//! ├── config.rs       ◄─── Environment configuration
//! ├── error.rs        ◄─── AppError → HTTP response
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (config, database, cart sessions)
//! │   └── cart.rs     ◄─── Cart sessions with idle expiry
//! └── routes/
//!     ├── mod.rs      ◄─── Route table, health check
//!     ├── cart.rs     ◄─── Cart view, add/update, confirm, cancel
//!     ├── cart_items.rs ◄─ Persisted cart item CRUD
//!     └── inventory.rs ◄── Inventory listing
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use state::AppState;

/// Builds the application router with request tracing attached.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=basket=trace` - Show trace for basket crates only
/// - Default: `info,basket=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,basket=debug,sqlx=warn"));

    // A subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
