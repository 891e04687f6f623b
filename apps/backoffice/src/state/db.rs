//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! ## Thread Safety
//! The `Database` struct from `mortar-db` contains a `SqlitePool` which
//! is inherently thread-safe. Commands can share one `DbState` freely.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn search_products(db: &DbState, query: String) -> Result<Vec<ProductDto>, ApiError> {
//!     let products = db.inner().products().search(&query).await?;
//!     Ok(products.into_iter().map(ProductDto::from).collect())
//! }
//! ```

use mortar_db::Database;

/// Wrapper around `Database` handed to every command.
#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
