//! Cart synchronization engine and store for EcoCart.
//!
//! This crate provides:
//! - `CartRemoteClient` / `ProductCatalogClient` - seams to the remote services
//! - `CartSyncEngine` - the only writer of the cart store
//! - `CartStore` - shared, read-only view of the current cart
//! - `InMemoryCartRemote` / `InMemoryCatalog` - in-process collaborators
//! - `EngineConfig` - pricing and scoring policies loaded from TOML or JSON
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use eco_sync::{CartStore, CartSyncEngine};
//!
//! let store = CartStore::new();
//! let engine = CartSyncEngine::new(Arc::new(remote), Arc::new(catalog), store.clone());
//!
//! let update = engine.add(&owner, &product, 2, false).await?;
//! for warning in &update.warnings {
//!     eprintln!("{}", warning);
//! }
//! let summary = store.summary(tier, &donation, &config.pricing, &config.eco)?;
//! ```

mod client;
mod config;
mod engine;
mod error;
mod memory;
mod store;

pub use client::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use memory::*;
pub use store::*;
