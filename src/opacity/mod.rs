//! Opacity data: cross-section tables and their loader
//!
//! The store is a leaf component: it knows nothing about atmospheres or
//! geometry, it only answers "what is sigma(lambda) for this species at
//! this (T, P)". Tables are loaded once ([`load_store`]) or assembled in
//! memory ([`OpacityStore::new`] + inserts) and then shared read-only.

pub mod loader;
pub mod store;

pub use loader::{load_store, OpacityConfig};
pub use store::{OpacityStore, MIN_CROSS_SECTION};
