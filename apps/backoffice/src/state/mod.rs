//! # State Module
//!
//! Application state shared by the back-office commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                 ┌────────────────────────────┐                          │
//! │                 │        AppContext          │                          │
//! │                 └─────────────┬──────────────┘                          │
//! │                    ┌──────────┴──────────┐                              │
//! │                    ▼                     ▼                              │
//! │            ┌──────────────┐     ┌──────────────────┐                    │
//! │            │   DbState    │     │   ConfigState    │                    │
//! │            │  Database    │     │  store_name      │                    │
//! │            │  (SQLite     │     │  currency        │                    │
//! │            │   pool)      │     │  export_dir      │                    │
//! │            └──────────────┘     └──────────────────┘                    │
//! │                                                                         │
//! │  Commands take only the state they need: `&DbState`, `&ConfigState`,  │
//! │  or both.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::ConfigState;
pub use db::DbState;

use mortar_db::{Database, DbConfig, DbResult};

/// Everything a running back-office needs.
#[derive(Debug)]
pub struct AppContext {
    pub db: DbState,
    pub config: ConfigState,
}

impl AppContext {
    /// Connects the database (running migrations) and pairs it with `config`.
    pub async fn open(config: ConfigState, db_config: DbConfig) -> DbResult<Self> {
        let db = Database::new(db_config).await?;
        Ok(AppContext {
            db: DbState::new(db),
            config,
        })
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        self.db.inner().close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let ctx = AppContext::open(ConfigState::default(), DbConfig::in_memory())
            .await
            .unwrap();

        assert!(ctx.db.inner().health_check().await);
        assert_eq!(ctx.db.inner().categories().list().await.unwrap().len(), 7);

        ctx.close().await;
    }
}
