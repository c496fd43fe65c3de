//! # Basket Web Server
//!
//! ```text
//! client ───► axum (BASKET_BIND_ADDR) ───► routes ───► basket-core ───► SQLite
//!                                             │
//!                                             ▼
//!                                       cart sessions
//!                                         (moka)
//! ```

use tokio::net::TcpListener;
use tracing::info;

use basket_db::Database;
use basket_web::config::WebConfig;
use basket_web::state::AppState;
use basket_web::{build_router, init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting Basket web server...");

    let config = WebConfig::load()?;
    info!(
        addr = %config.bind_addr,
        db_path = %config.db_path.display(),
        policy = %config.commit_policy,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    let addr = config.bind_addr;
    let state = AppState::new(config, db.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}
