//! # Mortar Back-office Entry Point
//!
//! Opens the store database, applies migrations and logs the day's
//! dashboard. The actual setup is in `lib.rs`.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Determine database path (app data directory)
//! 3. Connect to database & run migrations
//! 4. Load configuration (`MORTAR_*` variables)
//! 5. Log dashboard statistics and low-stock alerts

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mortar_backoffice::run().await
}
