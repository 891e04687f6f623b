//! # Back-office Commands
//!
//! Every action the presentation layer can trigger.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── category.rs  ◄─── Category CRUD and search
//! ├── product.rs   ◄─── Product CRUD, search, stock adjustment
//! ├── party.rs     ◄─── Client and supplier CRUD, history
//! ├── sale.rs      ◄─── Sale creation, cancellation, listing
//! ├── purchase.rs  ◄─── Purchase creation, cancellation, listing
//! ├── report.rs    ◄─── Dashboard, low stock, date-range reports
//! ├── export.rs    ◄─── Catalog CSV export
//! └── config.rs    ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI form ──► Form DTO (camelCase, strings as typed)                     │
//! │                  │                                                      │
//! │                  ▼  parse + validate (mortar-core)                      │
//! │             Input type (ProductInput, SaleDraft, ...)                   │
//! │                  │                                                      │
//! │                  ▼  repository call (mortar-db)                         │
//! │             Row type ──► Response DTO                                   │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  Result<Dto, ApiError> ──► Feedback { success, message }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn search_products(db: &DbState, ...)
//!
//! // Needs configuration for defaults and formatting
//! async fn create_product(db: &DbState, config: &ConfigState, ...)
//! ```

pub mod category;
pub mod config;
pub mod export;
pub mod party;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;
