use serde::Deserialize;
use serde_json::json;

use flashcart_cart::Cart;
use flashcart_checkout::Strategy;
use flashcart_core::{ExpectedVersion, Money, PageRequest};
use flashcart_inventory::SearchFilter;

use crate::app::errors;

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(0))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    /// Decimal major units, e.g. `12.50`.
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn to_filter(&self) -> Result<SearchFilter, axum::response::Response> {
        let mut filter = SearchFilter::new()
            .min_price(parse_price(self.min_price.as_deref())?)
            .max_price(parse_price(self.max_price.as_deref())?);
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            filter = filter.query(q);
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            filter = filter.category(category);
        }
        Ok(filter)
    }

    pub fn to_page(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(0))
    }
}

/// `?mode=unsafe|safe|optimistic|batch&version=N`.
#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    pub mode: Option<String>,
    /// Expected cart version for optimistic writes; defaults to 1.
    pub version: Option<u64>,
}

impl ModeQuery {
    pub fn strategy(&self) -> Result<Strategy, axum::response::Response> {
        match self.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            None => Ok(Strategy::default()),
            Some(mode) => mode.parse().map_err(errors::domain_error_to_response),
        }
    }

    pub fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion(self.version.unwrap_or(1))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FlashSaleQuery {
    pub quantity: Option<u32>,
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub cart_id: String,
    #[serde(default, alias = "address")]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// A cart with its computed total.
pub fn cart_to_json(cart: &Cart) -> serde_json::Value {
    json!({
        "id": cart.id,
        "user_id": cart.user_id,
        "items": cart.items,
        "total": cart.total(),
        "version": cart.version,
        "created_at": cart.created_at,
        "updated_at": cart.updated_at,
    })
}

/// A zero bound means "no bound".
fn parse_price(raw: Option<&str>) -> Result<Option<Money>, axum::response::Response> {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(price) => price
            .parse::<Money>()
            .map(|money| Some(money).filter(|m| *m != Money::ZERO))
            .map_err(errors::domain_error_to_response),
    }
}
