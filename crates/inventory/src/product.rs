use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flashcart_core::{Money, ProductId, Versioned};

/// Catalog product snapshot.
///
/// `stock` is signed: the unsynchronized strategies are allowed to oversell
/// and the counter must be able to show it. Every correct strategy keeps it
/// non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    /// Starts at 1, +1 per committed stock mutation.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= i64::from(quantity)
    }

    pub(crate) fn apply_stock(&mut self, stock: i64) {
        self.stock = stock;
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

impl Versioned for Product {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Attributes of a product that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    pub stock: u32,
}

impl NewProduct {
    pub(crate) fn into_product(self, id: ProductId) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            stock: i64::from(self.stock),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of an administrative stock overwrite.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct StockChange {
    pub product_id: ProductId,
    pub old_stock: i64,
    pub new_stock: i64,
}
