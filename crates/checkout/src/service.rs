use std::sync::Arc;

use flashcart_cart::{Cart, CartStore};
use flashcart_core::{
    CartId, DelayPolicy, DelaySite, DomainError, DomainResult, ExpectedVersion, OrderId, ProductId,
    UserId,
};
use flashcart_inventory::{InventoryStore, Product, Reservation};

use crate::book::{CheckoutStats, OrderBook};
use crate::order::{Order, OrderItem, OrderSource};
use crate::strategy::CheckoutStrategy;

/// Input for turning a cart into an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub cart_id: CartId,
    pub user_id: UserId,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
}

impl CheckoutRequest {
    pub fn new(cart_id: CartId, user_id: UserId) -> Self {
        Self {
            cart_id,
            user_id,
            shipping_address: None,
            payment_method: None,
        }
    }

    pub fn shipping_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = Some(address.into());
        self
    }

    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }
}

/// Checkout orchestrator.
///
/// Never mutates carts or products directly: every stock change goes through
/// an [`InventoryStore`] operation, and no store lock is held while another
/// store is called.
#[derive(Debug)]
pub struct CheckoutService {
    inventory: Arc<InventoryStore>,
    carts: Arc<CartStore>,
    book: OrderBook,
    delays: DelayPolicy,
}

impl CheckoutService {
    pub fn new(inventory: Arc<InventoryStore>, carts: Arc<CartStore>, delays: DelayPolicy) -> Self {
        Self {
            inventory,
            carts,
            book: OrderBook::new(),
            delays,
        }
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    pub fn stats(&self) -> CheckoutStats {
        self.book.stats()
    }

    pub fn order(&self, id: OrderId) -> DomainResult<Order> {
        self.book.order(id)
    }

    pub fn orders_for_user(&self, user_id: UserId) -> Vec<Order> {
        self.book.orders_for_user(user_id)
    }

    pub fn create_order(&self, strategy: CheckoutStrategy, request: &CheckoutRequest) -> DomainResult<Order> {
        match strategy {
            CheckoutStrategy::Unsynchronized => self.create_order_unsynchronized(request),
            CheckoutStrategy::Safe => self.create_order_safe(request),
            CheckoutStrategy::Optimistic => self.create_order_optimistic(request),
            CheckoutStrategy::BatchReserve => self.create_order_batch_reserve(request),
        }
    }

    /// Per item: read live product, check, pause, then subtract with no
    /// further check.
    ///
    /// Concurrent checkouts of the same product can all pass their checks and
    /// oversell. Items decremented before a later failure stay decremented.
    pub fn create_order_unsynchronized(&self, request: &CheckoutRequest) -> DomainResult<Order> {
        let cart = self.checkout_cart(request)?;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = self.inventory.get(line.product_id)?;
            ensure_stock(&product, line.quantity)?;

            self.delays.pause(DelaySite::CheckoutItem);
            self.inventory
                .subtract_stock_unchecked(line.product_id, line.quantity)?;
            items.push(order_item(&product, line.quantity));
        }

        Ok(self.place(request, items, CheckoutStrategy::Unsynchronized))
    }

    /// Check every item, then decrement each through the protected store path.
    ///
    /// The checks and the decrements are separate steps: another checkout can
    /// take the stock in between, in which case the decrement fails and earlier
    /// items of this order stay decremented.
    pub fn create_order_safe(&self, request: &CheckoutRequest) -> DomainResult<Order> {
        let cart = self.checkout_cart(request)?;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = self.inventory.get(line.product_id)?;
            if let Err(err) = ensure_stock(&product, line.quantity) {
                self.book.record_failure();
                tracing::warn!(cart_id = %cart.id, %err, "checkout refused");
                return Err(err);
            }
            items.push(order_item(&product, line.quantity));
        }

        for item in &items {
            if let Err(err) = self.inventory.decrement_stock(item.product_id, item.quantity) {
                if matches!(err, DomainError::InsufficientStock { .. }) {
                    self.book.record_failure();
                }
                tracing::warn!(cart_id = %cart.id, product_id = %item.product_id, %err, "stock taken between check and decrement");
                return Err(err);
            }
        }

        Ok(self.place(request, items, CheckoutStrategy::Safe))
    }

    /// Per item: decrement only if the product is still at the version read.
    ///
    /// A lost race returns the already-taken stock, counts a race and fails
    /// with `VersionConflict`; the caller may retry.
    pub fn create_order_optimistic(&self, request: &CheckoutRequest) -> DomainResult<Order> {
        let cart = self.checkout_cart(request)?;

        let mut items: Vec<OrderItem> = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let taken = self.inventory.get(line.product_id).and_then(|product| {
                ensure_stock(&product, line.quantity)?;
                self.delays.pause(DelaySite::CheckoutItem);
                self.inventory.decrement_stock_optimistic(
                    line.product_id,
                    line.quantity,
                    ExpectedVersion::of(&product),
                )?;
                Ok(order_item(&product, line.quantity))
            });

            match taken {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.give_back(&items);
                    match err {
                        DomainError::VersionConflict { .. } => self.book.record_race(),
                        DomainError::InsufficientStock { .. } => self.book.record_failure(),
                        _ => {}
                    }
                    tracing::warn!(cart_id = %cart.id, %err, returned = items.len(), "optimistic checkout abandoned");
                    return Err(err);
                }
            }
        }

        Ok(self.place(request, items, CheckoutStrategy::Optimistic))
    }

    /// Reserve the whole cart as one all-or-nothing unit.
    pub fn create_order_batch_reserve(&self, request: &CheckoutRequest) -> DomainResult<Order> {
        let cart = self.checkout_cart(request)?;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = self.inventory.get(line.product_id)?;
            items.push(order_item(&product, line.quantity));
        }

        let reservation: Reservation = items.iter().map(|i| (i.product_id, i.quantity)).collect();
        if let Err(err) = self.inventory.reserve_batch(&reservation) {
            if err == DomainError::ReservationFailed {
                self.book.record_race();
            }
            return Err(err);
        }

        Ok(self.place(request, items, CheckoutStrategy::BatchReserve))
    }

    /// Single-product purchase under heavy contention.
    ///
    /// Checks stock, waits the user's thinking time, then takes the stock
    /// through the protected decrement, which re-checks it.
    pub fn flash_sale_purchase(
        &self,
        product_id: ProductId,
        quantity: u32,
        user_id: UserId,
    ) -> DomainResult<Order> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }

        let product = self.inventory.get(product_id)?;
        let purchase = ensure_stock(&product, quantity).and_then(|()| {
            self.delays.pause_thinking(user_id);
            self.inventory.decrement_stock(product_id, quantity)
        });

        if let Err(err) = purchase {
            if matches!(err, DomainError::InsufficientStock { .. }) {
                self.book.record_failure();
            }
            tracing::debug!(%product_id, %user_id, %err, "flash sale purchase refused");
            return Err(err);
        }

        let order = Order::pending(user_id, vec![order_item(&product, quantity)], OrderSource::FlashSale);
        Ok(self.book.record(order))
    }

    /// Resolve the cart and check it may be checked out by the requester.
    fn checkout_cart(&self, request: &CheckoutRequest) -> DomainResult<Cart> {
        let cart = self
            .carts
            .get_by_id(request.cart_id)
            .ok_or_else(|| DomainError::cart_not_found(request.cart_id))?;

        if cart.user_id != request.user_id {
            tracing::warn!(cart_id = %cart.id, owner = %cart.user_id, requester = %request.user_id, "checkout of foreign cart");
            return Err(DomainError::Unauthorized);
        }
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }
        Ok(cart)
    }

    fn give_back(&self, items: &[OrderItem]) {
        for item in items {
            if let Err(err) = self.inventory.restock(item.product_id, item.quantity) {
                tracing::error!(product_id = %item.product_id, quantity = item.quantity, %err, "failed to return stock");
            }
        }
    }

    fn place(&self, request: &CheckoutRequest, items: Vec<OrderItem>, strategy: CheckoutStrategy) -> Order {
        let order = Order::pending(request.user_id, items, OrderSource::Checkout(strategy)).ship_to(
            request.shipping_address.clone(),
            request.payment_method.clone(),
        );
        self.book.record(order)
    }
}

fn ensure_stock(product: &Product, quantity: u32) -> DomainResult<()> {
    if product.has_stock_for(quantity) {
        Ok(())
    } else {
        Err(DomainError::InsufficientStock {
            product_id: product.id,
            requested: quantity,
            available: product.stock,
        })
    }
}

/// Order lines carry the live catalog price and name, not the cart snapshot.
fn order_item(product: &Product, quantity: u32) -> OrderItem {
    OrderItem {
        product_id: product.id,
        quantity,
        price: product.price,
        name: product.name.clone(),
    }
}
