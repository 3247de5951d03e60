//! Product catalog module.
//!
//! Contains the catalog wire shape and the point-in-time product snapshots
//! carried by cart line items.

mod product;

pub use product::{CatalogEntry, ProductDetails, ProductSnapshot, MAX_RATING, MIN_RATING};
