//! # Catalog Export
//!
//! Renders the product catalog as delimited text. Rendering is pure; the
//! backoffice decides where the bytes go.
//!
//! ## Format
//! ```text
//! id,name,category,purchase_price,sale_price,quantity,reorder_threshold
//! 9b1c…,Ciment CPJ 45,Ciment,900.00,1150.00,120,20
//! 4e0a…,"Brique 8 trous, rouge",Briques,25.00,35.00,4000,500
//! ```
//!
//! Fields containing the delimiter, a quote or a line break are quoted,
//! with embedded quotes doubled.

use crate::money::Money;
use crate::types::CatalogRow;

/// Header row of the catalog export.
pub const CATALOG_HEADER: [&str; 7] = [
    "id",
    "name",
    "category",
    "purchase_price",
    "sale_price",
    "quantity",
    "reorder_threshold",
];

/// Quotes a field if it needs it.
fn escape_field(field: &str, delimiter: char) -> String {
    let needs_quotes = field.contains(delimiter)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r');

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record(out: &mut String, fields: &[&str], delimiter: char) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(delimiter);
        }
        first = false;
        out.push_str(&escape_field(field, delimiter));
    }
    out.push_str("\r\n");
}

/// Renders catalog rows with the given delimiter, header first.
///
/// ## Example
/// ```rust
/// use mortar_core::export::render_catalog;
/// use mortar_core::CatalogRow;
///
/// let rows = vec![CatalogRow {
///     id: "p1".into(),
///     name: "Plâtre 40kg".into(),
///     category_name: None,
///     purchase_price_cents: 60_000,
///     sale_price_cents: 75_050,
///     quantity: 12,
///     reorder_threshold: 5,
/// }];
/// let text = render_catalog(&rows, ';');
/// assert!(text.ends_with("p1;Plâtre 40kg;;600.00;750.50;12;5\r\n"));
/// ```
pub fn render_catalog(rows: &[CatalogRow], delimiter: char) -> String {
    let mut out = String::new();
    write_record(&mut out, &CATALOG_HEADER, delimiter);

    for row in rows {
        let purchase = Money::from_cents(row.purchase_price_cents).to_string();
        let sale = Money::from_cents(row.sale_price_cents).to_string();
        let quantity = row.quantity.to_string();
        let threshold = row.reorder_threshold.to_string();

        write_record(
            &mut out,
            &[
                row.id.as_str(),
                row.name.as_str(),
                row.category_name.as_deref().unwrap_or(""),
                purchase.as_str(),
                sale.as_str(),
                quantity.as_str(),
                threshold.as_str(),
            ],
            delimiter,
        );
    }

    out
}

/// Renders catalog rows as comma-separated values.
pub fn render_catalog_csv(rows: &[CatalogRow]) -> String {
    render_catalog(rows, ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, category: Option<&str>) -> CatalogRow {
        CatalogRow {
            id: "id-1".to_string(),
            name: name.to_string(),
            category_name: category.map(str::to_string),
            purchase_price_cents: 90_000,
            sale_price_cents: 115_000,
            quantity: 120,
            reorder_threshold: 20,
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(
            render_catalog_csv(&[]),
            "id,name,category,purchase_price,sale_price,quantity,reorder_threshold\r\n"
        );
    }

    #[test]
    fn test_plain_row() {
        let text = render_catalog_csv(&[row("Ciment CPJ 45", Some("Ciment"))]);
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines[1], "id-1,Ciment CPJ 45,Ciment,900.00,1150.00,120,20");
    }

    #[test]
    fn test_quoting() {
        let text = render_catalog_csv(&[row("Brique 8 trous, \"rouge\"", None)]);
        assert!(text.contains("id-1,\"Brique 8 trous, \"\"rouge\"\"\",,900.00"));
    }

    #[test]
    fn test_delimiter_specific_quoting() {
        let text = render_catalog(&[row("Vis 4,5x40", None)], ';');
        assert!(text.contains("id-1;Vis 4,5x40;;"));
    }
}
