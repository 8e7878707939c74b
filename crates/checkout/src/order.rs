use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flashcart_core::{Money, OrderId, ProductId, UserId};

use crate::strategy::CheckoutStrategy;

/// Order status lifecycle. Checkout only ever produces `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Which checkout path produced an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    Checkout(CheckoutStrategy),
    FlashSale,
}

/// Order line: product, quantity, unit price and display name at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price in cents.
    pub price: Money,
    pub name: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// An order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub status: OrderStatus,
    pub source: OrderSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub(crate) fn pending(user_id: UserId, items: Vec<OrderItem>, source: OrderSource) -> Self {
        let now = Utc::now();
        let total = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: OrderId::new(),
            user_id,
            items,
            total,
            status: OrderStatus::Pending,
            source,
            shipping_address: None,
            payment_method: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn ship_to(mut self, shipping_address: Option<String>, payment_method: Option<String>) -> Self {
        self.shipping_address = shipping_address;
        self.payment_method = payment_method;
        self
    }
}
