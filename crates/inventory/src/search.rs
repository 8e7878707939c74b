use flashcart_core::Money;

use crate::product::Product;

/// Catalog search filter.
///
/// Unset (or empty) dimensions impose no constraint. Text matching is a
/// case-insensitive substring match on name or description; category matches
/// exactly; the price range is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    query: Option<String>,
    category: Option<String>,
    min_price: Option<Money>,
    max_price: Option<Money>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = non_empty(query.into()).map(|q| q.to_lowercase());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = non_empty(category.into());
        self
    }

    pub fn min_price(mut self, price: Option<Money>) -> Self {
        self.min_price = price;
        self
    }

    pub fn max_price(mut self, price: Option<Money>) -> Self {
        self.max_price = price;
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        let query_ok = self.query.as_deref().is_none_or(|q| {
            product.name.to_lowercase().contains(q) || product.description.to_lowercase().contains(q)
        });
        let category_ok = self.category.as_deref().is_none_or(|c| product.category == c);
        let min_ok = self.min_price.is_none_or(|min| product.price >= min);
        let max_ok = self.max_price.is_none_or(|max| product.price <= max);

        query_ok && category_ok && min_ok && max_ok
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
