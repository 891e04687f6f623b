//! # Mortar Back-office Library
//!
//! Command layer of the Mortar back-office. A presentation layer links
//! against this crate, opens an [`AppContext`](state::AppContext) and calls
//! the functions in [`commands`].
//!
//! ## Module Organization
//! ```text
//! mortar_backoffice/
//! ├── lib.rs          ◄─── You are here (startup)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppContext
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── product.rs  ◄─── Product CRUD, search, stock
//! │   ├── sale.rs     ◄─── Sale recording/cancellation
//! │   └── ...         ◄─── category, party, purchase, report, export
//! └── error.rs        ◄─── ApiError and Feedback
//! ```

pub mod commands;
pub mod error;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mortar_db::DbConfig;
use state::{AppContext, ConfigState};

/// Runs the back-office startup check.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info,mortar=debug,sqlx=warn; override with RUST_LOG      │
/// │                                                                         │
/// │  2. Determine Database Path ──────────────────────────────────────────► │
/// │     • MORTAR_DB_PATH, else the platform data directory                  │
/// │                                                                         │
/// │  3. Open AppContext ──────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │     • ConfigState from MORTAR_* variables                               │
/// │                                                                         │
/// │  4. Log the dashboard and low-stock alerts, then close the pool ──────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Mortar back-office");

    let db_path = get_database_path()?;
    info!(?db_path, "Database path determined");

    let config = ConfigState::from_env();
    let ctx = AppContext::open(config, DbConfig::new(db_path)).await?;
    info!(store = %ctx.config.store_name, "Database connected and migrations applied");

    let summary = commands::report::dashboard(&ctx.db).await?;
    info!(
        products = summary.product_count,
        stock_value = %ctx.config.format_currency(summary.purchase_value_cents),
        sales_today = %ctx.config.format_currency(summary.sales_today_cents),
        month_margin = %ctx.config.format_currency(summary.month_margin_cents),
        low_stock = summary.low_stock_count,
        "Dashboard"
    );

    for product in commands::report::low_stock_alerts(&ctx.db).await? {
        warn!(
            product = %product.name,
            quantity = product.quantity,
            threshold = product.reorder_threshold,
            "Low stock"
        );
    }

    ctx.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mortar=trace` - Show trace for mortar crates only
/// - Default: `info,mortar=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mortar=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.mortar.backoffice/mortar.db`
/// - **Windows**: `%APPDATA%\mortar\backoffice\data\mortar.db`
/// - **Linux**: `~/.local/share/backoffice/mortar.db`
///
/// ## Development Override
/// Set `MORTAR_DB_PATH` environment variable to use a custom path.
fn get_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Check for override
    if let Ok(path) = std::env::var("MORTAR_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "mortar", "backoffice")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("mortar.db"))
}
