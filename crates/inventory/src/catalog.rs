//! Deterministic sample catalog used at startup and by load-style tests.

use flashcart_core::{Money, ProductId};

use crate::product::NewProduct;
use crate::store::InventoryStore;

pub const SAMPLE_CATALOG_SIZE: u64 = 1000;

/// Categories assigned cyclically by `id % 4`.
pub const CATEGORIES: [&str; 4] = ["Electronics", "Clothing", "Books", "Home"];

/// The sample product for catalog position `i` (1-based).
///
/// Name and description carry the letter `A + i % 26`, price is `(i % 1000) + 1`
/// whole units and stock is `(i % 100) + 1`.
pub fn sample_product(i: u64) -> NewProduct {
    let letter = char::from(b'A' + (i % 26) as u8);
    NewProduct {
        name: format!("Product {letter}"),
        description: format!("Description for product {letter}"),
        category: CATEGORIES[(i % 4) as usize].to_string(),
        price: Money::from_major((i % 1000) + 1),
        stock: ((i % 100) + 1) as u32,
    }
}

impl InventoryStore {
    /// Bulk-create `count` sample products. On an empty store they receive ids `1..=count`.
    pub fn seed_sample_catalog(&self, count: u64) -> Vec<ProductId> {
        let ids = self.insert_many((1..=count).map(sample_product));
        tracing::info!(count, "seeded sample catalog");
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcart_core::DelayPolicy;

    #[test]
    fn sample_fields_follow_the_position() {
        let p = sample_product(27);
        assert_eq!(p.name, "Product B");
        assert_eq!(p.description, "Description for product B");
        assert_eq!(p.category, "Home");
        assert_eq!(p.price, Money::from_major(28));
        assert_eq!(p.stock, 28);

        assert_eq!(sample_product(1000).price, Money::from_major(1));
        assert_eq!(sample_product(100).stock, 1);
    }

    #[test]
    fn seeding_assigns_sequential_ids() {
        let store = InventoryStore::new(DelayPolicy::none());
        let ids = store.seed_sample_catalog(SAMPLE_CATALOG_SIZE);
        assert_eq!(ids.len(), 1000);
        assert_eq!(ids.first(), Some(&ProductId::new(1)));
        assert_eq!(ids.last(), Some(&ProductId::new(1000)));
        assert_eq!(store.len(), 1000);

        let p4 = store.get(ProductId::new(4)).unwrap();
        assert_eq!(p4.category, "Electronics");
        assert_eq!(p4.stock, 5);
    }
}
