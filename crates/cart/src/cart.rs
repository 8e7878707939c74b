use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flashcart_core::{CartId, DomainError, DomainResult, Money, ProductId, UserId, Versioned};

/// One line of a cart.
///
/// `price` and `name` are snapshots taken when the line was added; they do not
/// follow later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A line to add: the product plus the price/name snapshot the caller read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub name: String,
}

/// Cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    /// One entry per distinct product, in insertion order.
    pub items: Vec<CartItem>,
    /// Starts at 1, +1 per accepted mutation.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub(crate) fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add-or-merge: an existing line gets `quantity` added and its price
    /// overwritten; otherwise a new line is appended.
    pub(crate) fn merge_item(&mut self, item: &NewCartItem) -> DomainResult<()> {
        ensure_positive(item.quantity)?;

        let now = Utc::now();
        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(item.quantity);
                line.price = item.price;
            }
            None => self.items.push(CartItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                name: item.name.clone(),
                added_at: now,
            }),
        }
        self.touch(now);
        Ok(())
    }

    /// Set (not increment) the quantity of an existing line.
    pub(crate) fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> DomainResult<()> {
        ensure_positive(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(DomainError::ItemNotFound(product_id))?;
        line.quantity = quantity;
        self.touch(Utc::now());
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.touch(Utc::now());
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

impl Versioned for Cart {
    fn version(&self) -> u64 {
        self.version
    }
}

fn ensure_positive(quantity: u32) -> DomainResult<()> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(())
}
