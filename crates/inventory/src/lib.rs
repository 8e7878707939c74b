//! Inventory: the single source of truth for "how much is left".
//!
//! Owns product records and their stock counters. Every stock write in the
//! system funnels through [`InventoryStore`]; callers only ever receive
//! snapshots.

pub mod catalog;
pub mod product;
pub mod search;
pub mod store;

pub use catalog::{sample_product, CATEGORIES, SAMPLE_CATALOG_SIZE};
pub use product::{NewProduct, Product, StockChange};
pub use search::SearchFilter;
pub use store::{InventoryStore, Reservation};
