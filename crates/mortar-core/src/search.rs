//! # Search Matching
//!
//! Case-insensitive substring search over the text fields of catalog and
//! party records. Matching happens in Rust rather than with SQL `LIKE`,
//! which only folds ASCII case in SQLite: "électricité" must find
//! "Électricité".

use crate::types::{Category, Client, Product, Supplier};

/// A record that exposes text fields to search.
pub trait Searchable {
    /// The fields the term is matched against. `None` fields never match.
    fn search_fields(&self) -> Vec<Option<&str>>;
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(&self.name), self.description.as_deref()]
    }
}

impl Searchable for Category {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(&self.name), self.description.as_deref()]
    }
}

impl Searchable for Client {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(&self.name),
            self.address.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
        ]
    }
}

impl Searchable for Supplier {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(&self.name),
            self.address.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
        ]
    }
}

/// Whether any field contains `term`, ignoring case.
///
/// An empty term matches everything.
///
/// ## Example
/// ```rust
/// use mortar_core::search::matches_term;
///
/// assert!(matches_term(&[Some("Fil Électrique 2.5mm")], "électrique"));
/// assert!(matches_term(&[None, Some("0550 12 34 56")], "12 34"));
/// assert!(!matches_term(&[None], "x"));
/// ```
pub fn matches_term(fields: &[Option<&str>], term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Keeps the records matching `term`, preserving order.
pub fn filter_matching<T: Searchable>(records: Vec<T>, term: &str) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| matches_term(&r.search_fields(), term))
        .collect()
}
