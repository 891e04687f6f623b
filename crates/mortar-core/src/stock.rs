//! # Stock Planning
//!
//! Pure planning of the stock effect of sales, purchases, cancellations and
//! manual adjustments. The database layer reads the current state inside a
//! transaction, asks this module for a plan, and applies it verbatim.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleDraft { client, [(P1, 4), (P2, 1), (P1, 2)] }                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_sale_draft        lines present, quantities in range          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  snapshots read in tx       P1 { qty 10, 150.00 }, P2 { qty 1, 80.00 }  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_sale                  demand P1 = 6 ≤ 10 ✓, P2 = 1 ≤ 1 ✓          │
//! │       │                     every line checked against the state        │
//! │       │                     BEFORE the sale, never a running balance    │
//! │       ▼                                                                 │
//! │  TransactionPlan { lines (unit price frozen), total 980.00,             │
//! │                    deltas [P1 -6, P2 -1] }                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PurchaseDraft, PurchaseLine, SaleDraft, SaleLine};
use crate::validation::{validate_price_cents, validate_quantity, validate_text_len, MAX_TEXT_LEN};
use crate::MAX_TRANSACTION_LINES;

// =============================================================================
// Plan Types
// =============================================================================

/// What the planner needs to know about a product at the start of a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub sale_price_cents: i64,
}

/// A line ready to be inserted, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLine {
    pub product_id: String,
    pub position: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Net change to one product's on-hand quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: String,
    pub delta: i64,
}

/// Everything a repository writes for one sale or purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPlan {
    pub lines: Vec<PlannedLine>,
    pub total: Money,
    /// One entry per distinct product, in order of first appearance.
    pub deltas: Vec<StockDelta>,
}

// =============================================================================
// Draft Validation
// =============================================================================

fn validate_lines_shape(kind: &'static str, count: usize) -> CoreResult<()> {
    if count == 0 {
        return Err(CoreError::EmptyTransaction { kind });
    }
    if count > MAX_TRANSACTION_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_TRANSACTION_LINES as i64,
        }
        .into());
    }
    Ok(())
}

fn require_reference(field: &str, id: &str) -> CoreResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Checks a sale draft without touching any stored state.
pub fn validate_sale_draft(draft: &SaleDraft) -> CoreResult<()> {
    require_reference("client", &draft.client_id)?;
    validate_lines_shape("sale", draft.lines.len())?;
    for line in &draft.lines {
        require_reference("product", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }
    validate_text_len("notes", draft.notes.as_deref(), MAX_TEXT_LEN)?;
    Ok(())
}

/// Checks a purchase draft without touching any stored state.
pub fn validate_purchase_draft(draft: &PurchaseDraft) -> CoreResult<()> {
    require_reference("supplier", &draft.supplier_id)?;
    validate_lines_shape("purchase", draft.lines.len())?;
    for line in &draft.lines {
        require_reference("product", &line.product_id)?;
        validate_quantity(line.quantity)?;
        validate_price_cents("unit price", line.unit_price_cents)?;
    }
    validate_text_len("notes", draft.notes.as_deref(), MAX_TEXT_LEN)?;
    Ok(())
}

// =============================================================================
// Planning
// =============================================================================

/// Sums quantities per product, keeping first-appearance order.
fn aggregate<'a>(entries: impl IntoIterator<Item = (&'a str, i64)>) -> Vec<StockDelta> {
    let mut deltas: Vec<StockDelta> = Vec::new();
    for (product_id, quantity) in entries {
        match deltas.iter_mut().find(|d| d.product_id == product_id) {
            Some(existing) => existing.delta += quantity,
            None => deltas.push(StockDelta {
                product_id: product_id.to_string(),
                delta: quantity,
            }),
        }
    }
    deltas
}

fn line_amount(unit_price_cents: i64, quantity: i64) -> CoreResult<i64> {
    unit_price_cents.checked_mul(quantity).ok_or_else(|| {
        ValidationError::InvalidFormat {
            field: "total".to_string(),
            reason: "amount is too large".to_string(),
        }
        .into()
    })
}

fn checked_total(amounts: impl IntoIterator<Item = i64>) -> CoreResult<Money> {
    amounts
        .into_iter()
        .try_fold(0i64, |acc, amount| acc.checked_add(amount))
        .map(Money::from_cents)
        .ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "total".to_string(),
                reason: "amount is too large".to_string(),
            }
            .into()
        })
}

/// Plans a sale against the stock levels read at the start of the
/// transaction.
///
/// Lines naming the same product are summed before the stock check, so
/// `[(P, 3), (P, 3)]` against 5 units fails even though each line alone
/// would fit.
///
/// ## Errors
/// - `NotFound` if a line's product has no snapshot
/// - `InsufficientStock` for the first product whose demand exceeds supply
///
/// ## Example
/// ```rust
/// use mortar_core::stock::{plan_sale, ProductSnapshot};
/// use mortar_core::{SaleDraft, SaleLineRequest};
///
/// let cement = ProductSnapshot {
///     id: "p".into(), name: "Ciment".into(), quantity: 10, sale_price_cents: 15_000,
/// };
/// let draft = SaleDraft {
///     client_id: "c".into(),
///     lines: vec![SaleLineRequest { product_id: "p".into(), quantity: 4 }],
///     ..Default::default()
/// };
/// let plan = plan_sale(&draft, &[cement]).unwrap();
/// assert_eq!(plan.total.cents(), 60_000);
/// assert_eq!(plan.deltas[0].delta, -4);
/// ```
pub fn plan_sale(draft: &SaleDraft, snapshots: &[ProductSnapshot]) -> CoreResult<TransactionPlan> {
    validate_sale_draft(draft)?;

    let find = |id: &str| {
        snapshots
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found("Product", id))
    };

    let demand = aggregate(
        draft
            .lines
            .iter()
            .map(|l| (l.product_id.as_str(), l.quantity)),
    );

    for wanted in &demand {
        let snapshot = find(&wanted.product_id)?;
        if wanted.delta > snapshot.quantity {
            return Err(CoreError::InsufficientStock {
                product: snapshot.name.clone(),
                available: snapshot.quantity,
                requested: wanted.delta,
            });
        }
    }

    let lines = draft
        .lines
        .iter()
        .enumerate()
        .map(|(position, line)| {
            let snapshot = find(&line.product_id)?;
            Ok(PlannedLine {
                product_id: line.product_id.clone(),
                position: position as i64,
                quantity: line.quantity,
                unit_price_cents: snapshot.sale_price_cents,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let total = checked_total(
        lines
            .iter()
            .map(|l| line_amount(l.unit_price_cents, l.quantity))
            .collect::<CoreResult<Vec<_>>>()?,
    )?;

    let deltas = demand
        .into_iter()
        .map(|d| StockDelta {
            product_id: d.product_id,
            delta: -d.delta,
        })
        .collect();

    Ok(TransactionPlan {
        lines,
        total,
        deltas,
    })
}

/// Plans a purchase. Prices come from the draft and there is no
/// sufficiency check; product existence is the caller's job.
pub fn plan_purchase(draft: &PurchaseDraft) -> CoreResult<TransactionPlan> {
    validate_purchase_draft(draft)?;

    let lines: Vec<PlannedLine> = draft
        .lines
        .iter()
        .enumerate()
        .map(|(position, line)| PlannedLine {
            product_id: line.product_id.clone(),
            position: position as i64,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        })
        .collect();

    let total = checked_total(
        lines
            .iter()
            .map(|l| line_amount(l.unit_price_cents, l.quantity))
            .collect::<CoreResult<Vec<_>>>()?,
    )?;

    let deltas = aggregate(
        draft
            .lines
            .iter()
            .map(|l| (l.product_id.as_str(), l.quantity)),
    );

    Ok(TransactionPlan {
        lines,
        total,
        deltas,
    })
}

/// Stock returned to the shelves when a sale is cancelled.
pub fn sale_reversal(lines: &[SaleLine]) -> Vec<StockDelta> {
    aggregate(lines.iter().map(|l| (l.product_id.as_str(), l.quantity)))
}

/// Stock removed when a purchase is cancelled.
///
/// No floor is applied: cancelling a purchase whose goods were already sold
/// leaves a negative quantity.
pub fn purchase_reversal(lines: &[PurchaseLine]) -> Vec<StockDelta> {
    aggregate(lines.iter().map(|l| (l.product_id.as_str(), -l.quantity)))
}

/// Checks a manual stock adjustment and returns the resulting quantity.
///
/// ## Example
/// ```rust
/// use mortar_core::stock::check_adjustment;
///
/// assert_eq!(check_adjustment("Sable", 10, -4).unwrap(), 6);
/// assert!(check_adjustment("Sable", 3, -4).is_err());
/// ```
pub fn check_adjustment(product: &str, current: i64, delta: i64) -> CoreResult<i64> {
    let resulting = current.checked_add(delta).ok_or_else(|| {
        CoreError::from(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -current,
            max: i64::MAX - current,
        })
    })?;

    if resulting < 0 {
        return Err(CoreError::NegativeStock {
            product: product.to_string(),
            delta,
            resulting,
        });
    }

    Ok(resulting)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PurchaseLineRequest, SaleLineRequest};

    fn snapshot(id: &str, quantity: i64, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: id.to_string(),
            name: format!("Produit {}", id),
            quantity,
            sale_price_cents: price,
        }
    }

    fn sale(lines: &[(&str, i64)]) -> SaleDraft {
        SaleDraft {
            client_id: "client".to_string(),
            lines: lines
                .iter()
                .map(|(id, qty)| SaleLineRequest {
                    product_id: id.to_string(),
                    quantity: *qty,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_sale_prices_and_deltas() {
        let snaps = [snapshot("a", 10, 15_000), snapshot("b", 2, 8_000)];
        let plan = plan_sale(&sale(&[("a", 4), ("b", 1), ("a", 2)]), &snaps).unwrap();

        assert_eq!(plan.lines.len(), 3);
        assert_eq!(plan.lines[2].position, 2);
        assert_eq!(plan.lines[2].unit_price_cents, 15_000);
        assert_eq!(plan.total.cents(), 6 * 15_000 + 8_000);
        assert_eq!(
            plan.deltas,
            vec![
                StockDelta { product_id: "a".into(), delta: -6 },
                StockDelta { product_id: "b".into(), delta: -1 },
            ]
        );
    }

    #[test]
    fn test_plan_sale_exact_stock_is_allowed() {
        let snaps = [snapshot("a", 3, 100)];
        assert!(plan_sale(&sale(&[("a", 3)]), &snaps).is_ok());
    }

    #[test]
    fn test_plan_sale_insufficient_stock() {
        let snaps = [snapshot("a", 3, 100)];
        let err = plan_sale(&sale(&[("a", 5)]), &snaps).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 3, requested: 5, .. }
        ));
    }

    #[test]
    fn test_plan_sale_sums_duplicate_products() {
        let snaps = [snapshot("a", 5, 100)];
        let err = plan_sale(&sale(&[("a", 3), ("a", 3)]), &snaps).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: 6, .. }
        ));
    }

    #[test]
    fn test_plan_sale_unknown_product() {
        let err = plan_sale(&sale(&[("ghost", 1)]), &[]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_plan_sale_rejects_empty_and_zero() {
        assert!(matches!(
            plan_sale(&sale(&[]), &[]),
            Err(CoreError::EmptyTransaction { kind: "sale" })
        ));
        let snaps = [snapshot("a", 5, 100)];
        assert!(matches!(
            plan_sale(&sale(&[("a", 0)]), &snaps),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_plan_purchase() {
        let draft = PurchaseDraft {
            supplier_id: "s".to_string(),
            lines: vec![
                PurchaseLineRequest {
                    product_id: "a".to_string(),
                    quantity: 100,
                    unit_price_cents: 9_000,
                },
                PurchaseLineRequest {
                    product_id: "a".to_string(),
                    quantity: 20,
                    unit_price_cents: 8_500,
                },
            ],
            ..Default::default()
        };
        let plan = plan_purchase(&draft).unwrap();
        assert_eq!(plan.total.cents(), 100 * 9_000 + 20 * 8_500);
        assert_eq!(plan.deltas, vec![StockDelta { product_id: "a".into(), delta: 120 }]);
    }

    #[test]
    fn test_plan_purchase_rejects_negative_price() {
        let draft = PurchaseDraft {
            supplier_id: "s".to_string(),
            lines: vec![PurchaseLineRequest {
                product_id: "a".to_string(),
                quantity: 1,
                unit_price_cents: -5,
            }],
            ..Default::default()
        };
        assert!(matches!(plan_purchase(&draft), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_reversals() {
        let line = |product: &str, quantity: i64| PurchaseLine {
            id: "l".to_string(),
            purchase_id: "p".to_string(),
            product_id: product.to_string(),
            position: 0,
            quantity,
            unit_price_cents: 0,
        };
        let deltas = purchase_reversal(&[line("a", 4), line("b", 1), line("a", 1)]);
        assert_eq!(deltas[0], StockDelta { product_id: "a".into(), delta: -5 });
        assert_eq!(deltas[1], StockDelta { product_id: "b".into(), delta: -1 });
    }

    #[test]
    fn test_check_adjustment() {
        assert_eq!(check_adjustment("Sable", 0, 12).unwrap(), 12);
        assert_eq!(check_adjustment("Sable", 5, -5).unwrap(), 0);
        assert!(matches!(
            check_adjustment("Sable", 2, -3),
            Err(CoreError::NegativeStock { resulting: -1, .. })
        ));
    }
}
