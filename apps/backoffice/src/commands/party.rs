//! # Client & Supplier Commands
//!
//! Clients and suppliers share one shape, so they share one DTO and one
//! form. Each side gets its own set of commands plus its history view:
//! a client's sales, a supplier's deliveries.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::commands::purchase::PurchaseSummaryDto;
use crate::commands::sale::SaleSummaryDto;
use crate::error::ApiError;
use crate::state::DbState;
use mortar_core::{Client, PartyInput, Supplier};

/// Client or supplier as shown in lists and detail panes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PartyDto {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl From<Client> for PartyDto {
    fn from(c: Client) -> Self {
        PartyDto {
            id: c.id,
            name: c.name,
            address: c.address,
            phone: c.phone,
            email: c.email,
            notes: c.notes,
        }
    }
}

impl From<Supplier> for PartyDto {
    fn from(s: Supplier) -> Self {
        PartyDto {
            id: s.id,
            name: s.name,
            address: s.address,
            phone: s.phone,
            email: s.email,
            notes: s.notes,
        }
    }
}

/// Client/supplier form as submitted by the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PartyForm {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl From<PartyForm> for PartyInput {
    fn from(form: PartyForm) -> Self {
        PartyInput {
            name: form.name,
            address: form.address,
            phone: form.phone,
            email: form.email,
            notes: form.notes,
        }
    }
}

// =============================================================================
// Clients
// =============================================================================

pub async fn list_clients(db: &DbState) -> Result<Vec<PartyDto>, ApiError> {
    debug!("list_clients command");
    let clients = db.inner().clients().list().await?;
    Ok(clients.into_iter().map(PartyDto::from).collect())
}

/// Clients whose name, address, phone or email contains `query`.
pub async fn search_clients(db: &DbState, query: String) -> Result<Vec<PartyDto>, ApiError> {
    debug!(query = %query, "search_clients command");
    let clients = db.inner().clients().search(&query).await?;
    Ok(clients.into_iter().map(PartyDto::from).collect())
}

pub async fn get_client(db: &DbState, id: String) -> Result<PartyDto, ApiError> {
    debug!(id = %id, "get_client command");
    Ok(PartyDto::from(db.inner().clients().get(&id).await?))
}

pub async fn create_client(db: &DbState, form: PartyForm) -> Result<PartyDto, ApiError> {
    debug!(name = %form.name, "create_client command");
    let client = db.inner().clients().create(&form.into()).await?;
    Ok(PartyDto::from(client))
}

pub async fn update_client(db: &DbState, id: String, form: PartyForm) -> Result<PartyDto, ApiError> {
    debug!(id = %id, "update_client command");
    let client = db.inner().clients().update(&id, &form.into()).await?;
    Ok(PartyDto::from(client))
}

/// Deletes a client. Refused while any sale references it.
pub async fn delete_client(db: &DbState, id: String) -> Result<(), ApiError> {
    debug!(id = %id, "delete_client command");
    db.inner().clients().delete(&id).await?;
    Ok(())
}

/// The client's sales, newest first.
pub async fn client_history(db: &DbState, id: String) -> Result<Vec<SaleSummaryDto>, ApiError> {
    debug!(id = %id, "client_history command");
    let sales = db.inner().clients().purchase_history(&id).await?;
    Ok(sales.into_iter().map(SaleSummaryDto::from).collect())
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn list_suppliers(db: &DbState) -> Result<Vec<PartyDto>, ApiError> {
    debug!("list_suppliers command");
    let suppliers = db.inner().suppliers().list().await?;
    Ok(suppliers.into_iter().map(PartyDto::from).collect())
}

pub async fn search_suppliers(db: &DbState, query: String) -> Result<Vec<PartyDto>, ApiError> {
    debug!(query = %query, "search_suppliers command");
    let suppliers = db.inner().suppliers().search(&query).await?;
    Ok(suppliers.into_iter().map(PartyDto::from).collect())
}

pub async fn get_supplier(db: &DbState, id: String) -> Result<PartyDto, ApiError> {
    debug!(id = %id, "get_supplier command");
    Ok(PartyDto::from(db.inner().suppliers().get(&id).await?))
}

pub async fn create_supplier(db: &DbState, form: PartyForm) -> Result<PartyDto, ApiError> {
    debug!(name = %form.name, "create_supplier command");
    let supplier = db.inner().suppliers().create(&form.into()).await?;
    Ok(PartyDto::from(supplier))
}

pub async fn update_supplier(
    db: &DbState,
    id: String,
    form: PartyForm,
) -> Result<PartyDto, ApiError> {
    debug!(id = %id, "update_supplier command");
    let supplier = db.inner().suppliers().update(&id, &form.into()).await?;
    Ok(PartyDto::from(supplier))
}

/// Deletes a supplier. Refused while any purchase references it.
pub async fn delete_supplier(db: &DbState, id: String) -> Result<(), ApiError> {
    debug!(id = %id, "delete_supplier command");
    db.inner().suppliers().delete(&id).await?;
    Ok(())
}

/// Purchases received from the supplier, newest first.
pub async fn supplier_history(
    db: &DbState,
    id: String,
) -> Result<Vec<PurchaseSummaryDto>, ApiError> {
    debug!(id = %id, "supplier_history command");
    let purchases = db.inner().suppliers().delivery_history(&id).await?;
    Ok(purchases.into_iter().map(PurchaseSummaryDto::from).collect())
}
