//! # Party Repositories
//!
//! Clients and suppliers share one shape (name, address, phone, email,
//! notes) and one set of operations. A single generic repository serves
//! both, parameterized by a [`PartyKind`] that names the table, the row
//! type and the transactions that reference it.
//!
//! ```text
//! PartyRepository<ClientKind>   = ClientRepository    clients   ◄── sales
//! PartyRepository<SupplierKind> = SupplierRepository  suppliers ◄── purchases
//! ```

use std::marker::PhantomData;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{count_references, delete_conflict, generate_id};
use mortar_core::search::{filter_matching, Searchable};
use mortar_core::validation::{normalize_optional, validate_party, validate_search_query};
use mortar_core::{Client, PartyInput, PurchaseSummary, SaleSummary, Supplier};

// =============================================================================
// Party Kinds
// =============================================================================

/// Describes one kind of party.
pub trait PartyKind: Send + Sync + 'static {
    /// Row type read back from the table.
    type Record: for<'r> FromRow<'r, SqliteRow> + Searchable + Send + Unpin;

    /// Entity name used in errors and logs.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Transaction table whose rows reference this party.
    const DEPENDENT_TABLE: &'static str;
    const DEPENDENT_COLUMN: &'static str;
    /// Plural label of the dependents, for messages.
    const DEPENDENT_LABEL: &'static str;

    /// Builds a record from validated input.
    fn record(id: String, input: &PartyInput, now: chrono::DateTime<Utc>) -> Self::Record;
}

/// Marker for clients.
#[derive(Debug, Clone, Copy)]
pub struct ClientKind;

/// Marker for suppliers.
#[derive(Debug, Clone, Copy)]
pub struct SupplierKind;

impl PartyKind for ClientKind {
    type Record = Client;

    const ENTITY: &'static str = "Client";
    const TABLE: &'static str = "clients";
    const DEPENDENT_TABLE: &'static str = "sales";
    const DEPENDENT_COLUMN: &'static str = "client_id";
    const DEPENDENT_LABEL: &'static str = "sale(s)";

    fn record(id: String, input: &PartyInput, now: chrono::DateTime<Utc>) -> Client {
        Client {
            id,
            name: input.name.trim().to_string(),
            address: normalize_optional(input.address.as_deref()),
            phone: normalize_optional(input.phone.as_deref()),
            email: normalize_optional(input.email.as_deref()),
            notes: normalize_optional(input.notes.as_deref()),
            created_at: now,
            updated_at: now,
        }
    }
}

impl PartyKind for SupplierKind {
    type Record = Supplier;

    const ENTITY: &'static str = "Supplier";
    const TABLE: &'static str = "suppliers";
    const DEPENDENT_TABLE: &'static str = "purchases";
    const DEPENDENT_COLUMN: &'static str = "supplier_id";
    const DEPENDENT_LABEL: &'static str = "purchase(s)";

    fn record(id: String, input: &PartyInput, now: chrono::DateTime<Utc>) -> Supplier {
        Supplier {
            id,
            name: input.name.trim().to_string(),
            address: normalize_optional(input.address.as_deref()),
            phone: normalize_optional(input.phone.as_deref()),
            email: normalize_optional(input.email.as_deref()),
            notes: normalize_optional(input.notes.as_deref()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for clients.
pub type ClientRepository = PartyRepository<ClientKind>;

/// Repository for suppliers.
pub type SupplierRepository = PartyRepository<SupplierKind>;

// =============================================================================
// Repository
// =============================================================================

/// Repository for one kind of party.
///
/// ## Usage
/// ```rust,ignore
/// let client = db.clients().create(&input).await?;
/// let history = db.clients().purchase_history(&client.id).await?;
/// let found = db.suppliers().search("oran").await?;
/// ```
#[derive(Debug, Clone)]
pub struct PartyRepository<K: PartyKind> {
    pool: SqlitePool,
    _kind: PhantomData<K>,
}

impl<K: PartyKind> PartyRepository<K> {
    /// Creates a new repository over the pool.
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository {
            pool,
            _kind: PhantomData,
        }
    }

    fn select() -> String {
        format!(
            "SELECT id, name, address, phone, email, notes, created_at, updated_at FROM {}",
            K::TABLE
        )
    }

    /// Lists every party of this kind ordered by name.
    pub async fn list(&self) -> DbResult<Vec<K::Record>> {
        let sql = format!("{} ORDER BY name, id", Self::select());
        let records = sqlx::query_as::<_, K::Record>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    /// Case-insensitive substring search on name, address, phone and email.
    pub async fn search(&self, term: &str) -> DbResult<Vec<K::Record>> {
        let term = validate_search_query(term)?;
        debug!(entity = K::ENTITY, query = %term, "Searching parties");
        Ok(filter_matching(self.list().await?, &term))
    }

    /// Gets a party by id, or `None`.
    pub async fn find(&self, id: &str) -> DbResult<Option<K::Record>> {
        let sql = format!("{} WHERE id = ?1", Self::select());
        let record = sqlx::query_as::<_, K::Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    /// Gets a party by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such party
    pub async fn get(&self, id: &str) -> DbResult<K::Record> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found(K::ENTITY, id))
    }

    /// Creates a party.
    pub async fn create(&self, input: &PartyInput) -> DbResult<K::Record> {
        validate_party(input)?;

        let id = generate_id();
        let now = Utc::now();

        debug!(entity = K::ENTITY, name = %input.name.trim(), "Inserting party");

        let sql = format!(
            r#"
            INSERT INTO {} (id, name, address, phone, email, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            K::TABLE
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(input.name.trim())
            .bind(normalize_optional(input.address.as_deref()))
            .bind(normalize_optional(input.phone.as_deref()))
            .bind(normalize_optional(input.email.as_deref()))
            .bind(normalize_optional(input.notes.as_deref()))
            .bind(now)
            .execute(&self.pool)
            .await?;

        info!(entity = K::ENTITY, id = %id, "Party created");
        Ok(K::record(id, input, now))
    }

    /// Replaces every contact field of a party.
    pub async fn update(&self, id: &str, input: &PartyInput) -> DbResult<K::Record> {
        validate_party(input)?;

        debug!(entity = K::ENTITY, id = %id, "Updating party");

        let sql = format!(
            r#"
            UPDATE {} SET
                name = ?2,
                address = ?3,
                phone = ?4,
                email = ?5,
                notes = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            K::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(normalize_optional(input.address.as_deref()))
            .bind(normalize_optional(input.phone.as_deref()))
            .bind(normalize_optional(input.email.as_deref()))
            .bind(normalize_optional(input.notes.as_deref()))
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(K::ENTITY, id));
        }

        self.get(id).await
    }

    /// Deletes a party with no recorded transactions.
    ///
    /// ## Returns
    /// * `Err(DbError::HasDependents)` - sales (client) or purchases
    ///   (supplier) still reference it
    /// * `Err(DbError::NotFound)` - no such party
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;

        let dependents =
            count_references(&mut conn, K::DEPENDENT_TABLE, K::DEPENDENT_COLUMN, id).await?;
        if dependents > 0 {
            warn!(entity = K::ENTITY, id = %id, dependents, "Refusing to delete party with history");
            return Err(DbError::has_dependents(
                K::ENTITY,
                id,
                format!("{} {}", dependents, K::DEPENDENT_LABEL),
            ));
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1", K::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| delete_conflict(K::ENTITY, id, e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(K::ENTITY, id));
        }

        info!(entity = K::ENTITY, id = %id, "Party deleted");
        Ok(())
    }

    /// Counts parties of this kind.
    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", K::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

impl PartyRepository<ClientKind> {
    /// The client's sales, newest first.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such client
    pub async fn purchase_history(&self, client_id: &str) -> DbResult<Vec<SaleSummary>> {
        self.get(client_id).await?;

        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.client_id, c.name AS client_name, s.sold_at, s.total_cents
            FROM sales s
            JOIN clients c ON c.id = s.client_id
            WHERE s.client_id = ?1
            ORDER BY s.sold_at DESC, s.id
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }
}

impl PartyRepository<SupplierKind> {
    /// Purchases made from the supplier, newest first.
    pub async fn delivery_history(&self, supplier_id: &str) -> DbResult<Vec<PurchaseSummary>> {
        self.get(supplier_id).await?;

        let purchases = sqlx::query_as::<_, PurchaseSummary>(
            r#"
            SELECT p.id, p.supplier_id, s.name AS supplier_name, p.purchased_at, p.total_cents
            FROM purchases p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.supplier_id = ?1
            ORDER BY p.purchased_at DESC, p.id
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
