use std::collections::HashMap;
use std::sync::RwLock;

use flashcart_core::{
    sync, CartId, DelayPolicy, DelaySite, DomainError, DomainResult, ExpectedVersion, ProductId,
    UserId,
};

use crate::cart::{Cart, NewCartItem};

/// How a cart mutation is protected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CartWriteMode {
    /// No exclusive access: snapshot, pause, write the whole cart back.
    /// Concurrent writers can silently discard each other's changes.
    Unsynchronized,
    /// The entire read-modify-write runs under the store's write lock.
    Exclusive,
    /// Admitted only if the cart is still at the expected version; the loser
    /// gets `VersionConflict` and nothing changes. Never retried here.
    Optimistic(ExpectedVersion),
}

#[derive(Debug, Default)]
struct CartIndex {
    carts: HashMap<CartId, Cart>,
    /// Last-created cart per user.
    by_user: HashMap<UserId, CartId>,
}

/// In-memory cart store.
#[derive(Debug)]
pub struct CartStore {
    index: RwLock<CartIndex>,
    delays: DelayPolicy,
}

impl CartStore {
    pub fn new(delays: DelayPolicy) -> Self {
        Self {
            index: RwLock::new(CartIndex::default()),
            delays,
        }
    }

    /// Allocate an empty cart (version 1) and make it the user's current cart,
    /// replacing any earlier mapping.
    pub fn create(&self, user_id: UserId) -> Cart {
        let cart = Cart::new(user_id);
        let mut index = sync::write(&self.index);
        index.carts.insert(cart.id, cart.clone());
        if let Some(previous) = index.by_user.insert(user_id, cart.id) {
            tracing::debug!(%user_id, %previous, cart_id = %cart.id, "user cart replaced");
        }
        cart
    }

    pub fn get_by_id(&self, cart_id: CartId) -> Option<Cart> {
        sync::read(&self.index).carts.get(&cart_id).cloned()
    }

    pub fn get_by_user_id(&self, user_id: UserId) -> Option<Cart> {
        let index = sync::read(&self.index);
        index
            .by_user
            .get(&user_id)
            .and_then(|cart_id| index.carts.get(cart_id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        sync::read(&self.index).carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_item(&self, cart_id: CartId, mode: CartWriteMode, item: &NewCartItem) -> DomainResult<Cart> {
        self.mutate(cart_id, mode, DelaySite::CartWrite, |cart| cart.merge_item(item))
    }

    pub fn add_item_unsynchronized(&self, cart_id: CartId, item: &NewCartItem) -> DomainResult<Cart> {
        self.add_item(cart_id, CartWriteMode::Unsynchronized, item)
    }

    pub fn add_item_exclusive(&self, cart_id: CartId, item: &NewCartItem) -> DomainResult<Cart> {
        self.add_item(cart_id, CartWriteMode::Exclusive, item)
    }

    pub fn add_item_optimistic(
        &self,
        cart_id: CartId,
        item: &NewCartItem,
        expected: ExpectedVersion,
    ) -> DomainResult<Cart> {
        self.add_item(cart_id, CartWriteMode::Optimistic(expected), item)
    }

    /// Set the quantity of a line already in the cart (`ItemNotFound` otherwise).
    pub fn update_item_quantity(
        &self,
        cart_id: CartId,
        mode: CartWriteMode,
        product_id: ProductId,
        quantity: u32,
    ) -> DomainResult<Cart> {
        self.mutate(cart_id, mode, DelaySite::CartQuantityWrite, |cart| {
            cart.set_quantity(product_id, quantity)
        })
    }

    pub fn update_item_quantity_unsynchronized(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> DomainResult<Cart> {
        self.update_item_quantity(cart_id, CartWriteMode::Unsynchronized, product_id, quantity)
    }

    pub fn update_item_quantity_exclusive(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> DomainResult<Cart> {
        self.update_item_quantity(cart_id, CartWriteMode::Exclusive, product_id, quantity)
    }

    /// Empty the cart. Checkout does not call this; it exists for callers that
    /// want post-checkout clearing.
    pub fn clear(&self, cart_id: CartId) -> DomainResult<Cart> {
        self.mutate(cart_id, CartWriteMode::Exclusive, DelaySite::CartWrite, |cart| {
            cart.clear();
            Ok(())
        })
    }

    fn mutate(
        &self,
        cart_id: CartId,
        mode: CartWriteMode,
        site: DelaySite,
        apply: impl FnOnce(&mut Cart) -> DomainResult<()>,
    ) -> DomainResult<Cart> {
        match mode {
            CartWriteMode::Unsynchronized => self.mutate_unsynchronized(cart_id, site, apply),
            CartWriteMode::Exclusive => self.mutate_exclusive(cart_id, site, apply),
            CartWriteMode::Optimistic(expected) => self.mutate_optimistic(cart_id, site, expected, apply),
        }
    }

    fn mutate_unsynchronized(
        &self,
        cart_id: CartId,
        site: DelaySite,
        apply: impl FnOnce(&mut Cart) -> DomainResult<()>,
    ) -> DomainResult<Cart> {
        let mut cart = self
            .get_by_id(cart_id)
            .ok_or_else(|| DomainError::cart_not_found(cart_id))?;

        self.delays.pause(site);
        apply(&mut cart)?;

        // Blind write-back: whatever landed in between is overwritten.
        sync::write(&self.index).carts.insert(cart_id, cart.clone());
        tracing::debug!(%cart_id, version = cart.version, "cart written (unsynchronized)");
        Ok(cart)
    }

    fn mutate_exclusive(
        &self,
        cart_id: CartId,
        site: DelaySite,
        apply: impl FnOnce(&mut Cart) -> DomainResult<()>,
    ) -> DomainResult<Cart> {
        let mut index = sync::write(&self.index);
        let cart = index
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| DomainError::cart_not_found(cart_id))?;

        self.delays.pause(site);

        // Apply to a copy so a failed mutation leaves the stored cart untouched.
        let mut next = cart.clone();
        apply(&mut next)?;
        *cart = next;

        tracing::debug!(%cart_id, version = cart.version, "cart written");
        Ok(cart.clone())
    }

    fn mutate_optimistic(
        &self,
        cart_id: CartId,
        site: DelaySite,
        expected: ExpectedVersion,
        apply: impl FnOnce(&mut Cart) -> DomainResult<()>,
    ) -> DomainResult<Cart> {
        let observed = self
            .get_by_id(cart_id)
            .ok_or_else(|| DomainError::cart_not_found(cart_id))?;
        expected.check(&observed)?;

        self.delays.pause(site);

        let mut index = sync::write(&self.index);
        let cart = index
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| DomainError::cart_not_found(cart_id))?;

        if let Err(conflict) = expected.check(&*cart) {
            tracing::warn!(%cart_id, %conflict, "optimistic cart write rejected");
            return Err(conflict);
        }

        let mut next = cart.clone();
        apply(&mut next)?;
        *cart = next;

        tracing::debug!(%cart_id, version = cart.version, "cart written (optimistic)");
        Ok(cart.clone())
    }
}
