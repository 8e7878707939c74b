use std::collections::BTreeMap;
use std::sync::RwLock;

use flashcart_core::{
    sync, DelayPolicy, DelaySite, DomainError, DomainResult, ExpectedVersion, Page, PageRequest,
    ProductId,
};

use crate::product::{NewProduct, Product, StockChange};
use crate::search::SearchFilter;

#[derive(Debug)]
struct Catalog {
    products: BTreeMap<ProductId, Product>,
    next_id: u64,
}

/// In-memory product catalog with authoritative stock counters.
///
/// One reader-writer lock guards the whole catalog. Reads hold it shared for
/// their (delayed) duration; protected writes hold it exclusively, so two
/// protected decrements against the same product are linearizable.
#[derive(Debug)]
pub struct InventoryStore {
    catalog: RwLock<Catalog>,
    delays: DelayPolicy,
}

/// Quantities to reserve as one all-or-nothing unit.
///
/// Repeated entries for the same product are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reservation {
    lines: BTreeMap<ProductId, u32>,
}

impl Reservation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        let entry = self.lines.entry(product_id).or_default();
        *entry = entry.saturating_add(quantity);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().map(|(id, qty)| (*id, *qty))
    }
}

impl FromIterator<(ProductId, u32)> for Reservation {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        let mut reservation = Reservation::new();
        for (product_id, quantity) in iter {
            reservation.add(product_id, quantity);
        }
        reservation
    }
}

fn ensure_positive(quantity: u32) -> DomainResult<()> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(())
}

fn insufficient(product: &Product, requested: u32) -> DomainError {
    DomainError::InsufficientStock {
        product_id: product.id,
        requested,
        available: product.stock,
    }
}

impl InventoryStore {
    pub fn new(delays: DelayPolicy) -> Self {
        Self {
            catalog: RwLock::new(Catalog {
                products: BTreeMap::new(),
                next_id: 1,
            }),
            delays,
        }
    }

    /// A store pre-populated with `count` sample products.
    pub fn with_sample_catalog(count: u64, delays: DelayPolicy) -> Self {
        let store = Self::new(delays);
        store.seed_sample_catalog(count);
        store
    }

    pub fn delays(&self) -> &DelayPolicy {
        &self.delays
    }

    pub fn insert(&self, product: NewProduct) -> Product {
        let mut catalog = sync::write(&self.catalog);
        let id = ProductId::new(catalog.next_id);
        catalog.next_id += 1;
        let product = product.into_product(id);
        catalog.products.insert(id, product.clone());
        product
    }

    pub fn insert_many(&self, products: impl IntoIterator<Item = NewProduct>) -> Vec<ProductId> {
        let mut catalog = sync::write(&self.catalog);
        let mut ids = Vec::new();
        for product in products {
            let id = ProductId::new(catalog.next_id);
            catalog.next_id += 1;
            catalog.products.insert(id, product.into_product(id));
            ids.push(id);
        }
        ids
    }

    pub fn len(&self) -> usize {
        sync::read(&self.catalog).products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Products in ascending id order.
    pub fn list(&self, page: PageRequest) -> Page<Product> {
        let catalog = sync::read(&self.catalog);
        self.delays.pause(DelaySite::ProductList);

        let total = catalog.products.len();
        let items = catalog
            .products
            .values()
            .skip(page.offset())
            .take(page.limit())
            .cloned()
            .collect();
        Page::new(items, total, page)
    }

    pub fn get(&self, id: ProductId) -> DomainResult<Product> {
        let catalog = sync::read(&self.catalog);
        self.delays.pause(DelaySite::ProductLookup);

        catalog
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    /// Filtered products in ascending id order.
    pub fn search(&self, filter: &SearchFilter, page: PageRequest) -> Page<Product> {
        let catalog = sync::read(&self.catalog);
        self.delays.pause(DelaySite::ProductSearch);

        let matches: Vec<Product> = catalog
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        page.slice(matches)
    }

    /// Protected decrement: check and subtract under one exclusive lock.
    pub fn decrement_stock(&self, id: ProductId, quantity: u32) -> DomainResult<Product> {
        ensure_positive(quantity)?;

        let mut catalog = sync::write(&self.catalog);
        let product = catalog
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::product_not_found(id))?;

        self.delays.pause(DelaySite::StockWrite);

        if !product.has_stock_for(quantity) {
            return Err(insufficient(product, quantity));
        }

        let remaining = product.stock - i64::from(quantity);
        product.apply_stock(remaining);
        tracing::debug!(product_id = %id, quantity, stock = product.stock, "stock decremented");
        Ok(product.clone())
    }

    /// No-lock decrement.
    ///
    /// The sufficiency check runs on a snapshot; the subtraction is applied to
    /// whatever the live counter holds after the pause. Concurrent callers can
    /// all pass the check and jointly drive the counter below zero.
    pub fn decrement_stock_unsynchronized(&self, id: ProductId, quantity: u32) -> DomainResult<Product> {
        ensure_positive(quantity)?;

        let observed = self.snapshot(id)?;
        if !observed.has_stock_for(quantity) {
            return Err(insufficient(&observed, quantity));
        }

        self.delays.pause(DelaySite::StockWrite);

        let mut catalog = sync::write(&self.catalog);
        let product = catalog
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::product_not_found(id))?;
        let remaining = product.stock - i64::from(quantity);
        product.apply_stock(remaining);

        if product.stock < 0 {
            tracing::warn!(product_id = %id, stock = product.stock, "oversold");
        } else {
            tracing::debug!(product_id = %id, quantity, stock = product.stock, "stock decremented (unsynchronized)");
        }
        Ok(product.clone())
    }

    /// Subtract from the live counter with no sufficiency check and no pause.
    ///
    /// For callers that did their own check on an earlier read; the counter
    /// goes negative if that read is stale.
    pub fn subtract_stock_unchecked(&self, id: ProductId, quantity: u32) -> DomainResult<Product> {
        ensure_positive(quantity)?;

        let mut catalog = sync::write(&self.catalog);
        let product = catalog
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::product_not_found(id))?;
        let remaining = product.stock - i64::from(quantity);
        product.apply_stock(remaining);

        if product.stock < 0 {
            tracing::warn!(product_id = %id, stock = product.stock, "oversold");
        }
        Ok(product.clone())
    }

    /// Optimistic decrement: admitted only if the product is still at `expected`.
    ///
    /// The check and the pause run without holding the lock; the version is
    /// re-validated under the write lock before the subtraction commits.
    pub fn decrement_stock_optimistic(
        &self,
        id: ProductId,
        quantity: u32,
        expected: ExpectedVersion,
    ) -> DomainResult<Product> {
        ensure_positive(quantity)?;

        let observed = self.snapshot(id)?;
        expected.check(&observed)?;
        if !observed.has_stock_for(quantity) {
            return Err(insufficient(&observed, quantity));
        }

        self.delays.pause(DelaySite::StockWrite);

        let mut catalog = sync::write(&self.catalog);
        let product = catalog
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::product_not_found(id))?;

        if let Err(conflict) = expected.check(&*product) {
            tracing::warn!(product_id = %id, %conflict, "optimistic stock write rejected");
            return Err(conflict);
        }
        // Same version as the snapshot, so the same stock: no second check needed.
        let remaining = product.stock - i64::from(quantity);
        product.apply_stock(remaining);
        tracing::debug!(product_id = %id, quantity, version = product.version, "stock decremented (optimistic)");
        Ok(product.clone())
    }

    /// All-or-nothing reservation across several products.
    ///
    /// Every line is checked against current stock under one exclusive lock;
    /// only if all of them fit is anything decremented. A missing product or
    /// any shortfall yields `ReservationFailed` with no stock touched.
    pub fn reserve_batch(&self, reservation: &Reservation) -> DomainResult<()> {
        if reservation.is_empty() {
            return Err(DomainError::validation("reservation has no lines"));
        }

        let mut catalog = sync::write(&self.catalog);
        self.delays.pause(DelaySite::StockWrite);

        for (product_id, quantity) in reservation.iter() {
            let fits = catalog
                .products
                .get(&product_id)
                .is_some_and(|p| quantity > 0 && p.has_stock_for(quantity));
            if !fits {
                tracing::warn!(%product_id, quantity, "batch reservation rejected");
                return Err(DomainError::ReservationFailed);
            }
        }

        for (product_id, quantity) in reservation.iter() {
            if let Some(product) = catalog.products.get_mut(&product_id) {
                let remaining = product.stock - i64::from(quantity);
                product.apply_stock(remaining);
            }
        }

        tracing::debug!(lines = reservation.len(), "batch reserved");
        Ok(())
    }

    /// Administrative overwrite of a stock counter.
    pub fn set_stock(&self, id: ProductId, stock: u32) -> DomainResult<StockChange> {
        let mut catalog = sync::write(&self.catalog);
        let product = catalog
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::product_not_found(id))?;

        self.delays.pause(DelaySite::StockWrite);

        let old_stock = product.stock;
        product.apply_stock(i64::from(stock));
        tracing::info!(product_id = %id, old_stock, new_stock = product.stock, "stock overwritten");
        Ok(StockChange {
            product_id: id,
            old_stock,
            new_stock: product.stock,
        })
    }

    /// Return previously decremented quantity to a product.
    pub fn restock(&self, id: ProductId, quantity: u32) -> DomainResult<Product> {
        ensure_positive(quantity)?;

        let mut catalog = sync::write(&self.catalog);
        let product = catalog
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::product_not_found(id))?;

        let replenished = product.stock + i64::from(quantity);
        product.apply_stock(replenished);
        tracing::debug!(product_id = %id, quantity, stock = product.stock, "restocked");
        Ok(product.clone())
    }

    /// Undelayed read used internally by the write paths.
    fn snapshot(&self, id: ProductId) -> DomainResult<Product> {
        sync::read(&self.catalog)
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::product_not_found(id))
    }
}
