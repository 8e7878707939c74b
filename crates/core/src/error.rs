//! Domain error model.

use thiserror::Error;

use crate::id::{CartId, OrderId, ProductId};

/// Result type used across the checkout core.
pub type DomainResult<T> = Result<T, DomainError>;

/// The record an unresolved lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product(ProductId),
    Cart(CartId),
    Order(OrderId),
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Resource::Product(id) => write!(f, "product {id}"),
            Resource::Cart(id) => write!(f, "cart {id}"),
            Resource::Order(id) => write!(f, "order {id}"),
        }
    }
}

/// Domain-level error.
///
/// Every failure is returned synchronously to the immediate caller. Nothing in
/// the core retries on the caller's behalf; see [`DomainError::retry_class`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A product, cart or order id did not resolve.
    #[error("{0} not found")]
    NotFound(Resource),

    /// The requested quantity exceeds the stock observed at check time.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// An optimistic precondition failed (stale version).
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// A quantity update targeted a product that is not in the cart.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// The cart belongs to a different user.
    #[error("unauthorized")]
    Unauthorized,

    /// Checkout was attempted on a cart with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// A batch reservation could not satisfy every item atomically.
    #[error("inventory reservation failed")]
    ReservationFailed,

    /// A payload value the core refuses (e.g. zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),
}

/// How a caller should treat a failed operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Retry {
    /// Nothing happened; retrying (with fresh state) may succeed right away.
    Immediately,
    /// May succeed once stock is replenished.
    WhenRestocked,
    /// Will never succeed as requested.
    Never,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn product_not_found(id: ProductId) -> Self {
        Self::NotFound(Resource::Product(id))
    }

    pub fn cart_not_found(id: CartId) -> Self {
        Self::NotFound(Resource::Cart(id))
    }

    pub fn order_not_found(id: OrderId) -> Self {
        Self::NotFound(Resource::Order(id))
    }

    pub fn retry_class(&self) -> Retry {
        match self {
            DomainError::VersionConflict { .. } | DomainError::ReservationFailed => Retry::Immediately,
            DomainError::InsufficientStock { .. } => Retry::WhenRestocked,
            DomainError::NotFound(_)
            | DomainError::ItemNotFound(_)
            | DomainError::Unauthorized
            | DomainError::EmptyCart
            | DomainError::Validation(_) => Retry::Never,
        }
    }
}
