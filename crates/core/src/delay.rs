//! Injectable processing delays.
//!
//! Every store operation pauses at a named call site before completing. The
//! pauses widen the window in which concurrent operations interleave, which is
//! what makes lost updates and oversells observable under load. Tests use
//! [`DelayPolicy::none`] for deterministic functional checks and non-zero
//! policies for contention runs.
//!
//! Pauses are blocking sleeps on the calling thread. They are not cancellable
//! and are not counted against any timeout.

use std::time::Duration;

use crate::id::UserId;

/// Call sites that pause.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DelaySite {
    /// Single product read.
    ProductLookup,
    /// Paginated catalog listing.
    ProductList,
    /// Filtered catalog search.
    ProductSearch,
    /// Stock counter mutation.
    StockWrite,
    /// Cart add-or-merge.
    CartWrite,
    /// Cart set-quantity.
    CartQuantityWrite,
    /// Per-line-item inventory check during unsynchronized checkout.
    CheckoutItem,
}

impl DelaySite {
    pub fn as_str(self) -> &'static str {
        match self {
            DelaySite::ProductLookup => "product_lookup",
            DelaySite::ProductList => "product_list",
            DelaySite::ProductSearch => "product_search",
            DelaySite::StockWrite => "stock_write",
            DelaySite::CartWrite => "cart_write",
            DelaySite::CartQuantityWrite => "cart_quantity_write",
            DelaySite::CheckoutItem => "checkout_item",
        }
    }
}

/// Per-site pause durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayPolicy {
    pub product_lookup: Duration,
    pub product_list: Duration,
    pub product_search: Duration,
    pub stock_write: Duration,
    pub cart_write: Duration,
    pub cart_quantity_write: Duration,
    pub checkout_item: Duration,
    /// Fixed part of the flash-sale "thinking time".
    pub flash_sale_think: Duration,
    /// The user-dependent part is `user_id % spread` milliseconds.
    pub flash_sale_think_spread_ms: u64,
}

impl DelayPolicy {
    /// Default contention-widening timings, in milliseconds.
    pub fn reference() -> Self {
        Self {
            product_lookup: Duration::from_millis(5),
            product_list: Duration::from_millis(10),
            product_search: Duration::from_millis(20),
            stock_write: Duration::from_millis(15),
            cart_write: Duration::from_millis(20),
            cart_quantity_write: Duration::from_millis(30),
            checkout_item: Duration::from_millis(25),
            flash_sale_think: Duration::from_millis(50),
            flash_sale_think_spread_ms: 100,
        }
    }

    /// No pauses anywhere.
    pub fn none() -> Self {
        Self {
            product_lookup: Duration::ZERO,
            product_list: Duration::ZERO,
            product_search: Duration::ZERO,
            stock_write: Duration::ZERO,
            cart_write: Duration::ZERO,
            cart_quantity_write: Duration::ZERO,
            checkout_item: Duration::ZERO,
            flash_sale_think: Duration::ZERO,
            flash_sale_think_spread_ms: 0,
        }
    }

    /// The default timings multiplied by `factor`. Negative factors clamp to
    /// zero and results too large for a `Duration` saturate at `Duration::MAX`.
    pub fn scaled(factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };
        let scale = |d: Duration| {
            Duration::try_from_secs_f64(d.as_secs_f64() * factor).unwrap_or(Duration::MAX)
        };
        let reference = Self::reference();
        Self {
            product_lookup: scale(reference.product_lookup),
            product_list: scale(reference.product_list),
            product_search: scale(reference.product_search),
            stock_write: scale(reference.stock_write),
            cart_write: scale(reference.cart_write),
            cart_quantity_write: scale(reference.cart_quantity_write),
            checkout_item: scale(reference.checkout_item),
            flash_sale_think: scale(reference.flash_sale_think),
            flash_sale_think_spread_ms: (reference.flash_sale_think_spread_ms as f64 * factor).round() as u64,
        }
    }

    /// Builder-style override of a single site.
    pub fn with(mut self, site: DelaySite, duration: Duration) -> Self {
        *self.slot_mut(site) = duration;
        self
    }

    pub fn duration(&self, site: DelaySite) -> Duration {
        match site {
            DelaySite::ProductLookup => self.product_lookup,
            DelaySite::ProductList => self.product_list,
            DelaySite::ProductSearch => self.product_search,
            DelaySite::StockWrite => self.stock_write,
            DelaySite::CartWrite => self.cart_write,
            DelaySite::CartQuantityWrite => self.cart_quantity_write,
            DelaySite::CheckoutItem => self.checkout_item,
        }
    }

    fn slot_mut(&mut self, site: DelaySite) -> &mut Duration {
        match site {
            DelaySite::ProductLookup => &mut self.product_lookup,
            DelaySite::ProductList => &mut self.product_list,
            DelaySite::ProductSearch => &mut self.product_search,
            DelaySite::StockWrite => &mut self.stock_write,
            DelaySite::CartWrite => &mut self.cart_write,
            DelaySite::CartQuantityWrite => &mut self.cart_quantity_write,
            DelaySite::CheckoutItem => &mut self.checkout_item,
        }
    }

    /// Block the calling thread for the site's duration.
    pub fn pause(&self, site: DelaySite) {
        sleep(self.duration(site));
    }

    /// Flash-sale thinking time for `user`: fixed part plus `user % spread` ms.
    pub fn think_time(&self, user: UserId) -> Duration {
        let jitter = match self.flash_sale_think_spread_ms {
            0 => 0,
            spread => user.get() % spread,
        };
        self.flash_sale_think.saturating_add(Duration::from_millis(jitter))
    }

    pub fn pause_thinking(&self, user: UserId) {
        sleep(self.think_time(user));
    }

    pub fn is_disabled(&self) -> bool {
        *self == Self::none()
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::reference()
    }
}

fn sleep(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn think_time_depends_on_user() {
        let policy = DelayPolicy::reference();
        assert_eq!(policy.think_time(UserId::new(0)), Duration::from_millis(50));
        assert_eq!(policy.think_time(UserId::new(142)), Duration::from_millis(92));
        assert_eq!(DelayPolicy::none().think_time(UserId::new(142)), Duration::ZERO);
    }

    #[test]
    fn scaling_and_overrides() {
        let half = DelayPolicy::scaled(0.5);
        assert_eq!(half.duration(DelaySite::CartQuantityWrite), Duration::from_millis(15));
        assert_eq!(half.flash_sale_think_spread_ms, 50);
        assert!(DelayPolicy::scaled(0.0).is_disabled());

        let policy = DelayPolicy::none().with(DelaySite::StockWrite, Duration::from_millis(3));
        assert_eq!(policy.duration(DelaySite::StockWrite), Duration::from_millis(3));
        assert_eq!(policy.duration(DelaySite::CartWrite), Duration::ZERO);
    }

    #[test]
    fn huge_factors_saturate() {
        let policy = DelayPolicy::scaled(1e300);
        assert_eq!(policy.duration(DelaySite::StockWrite), Duration::MAX);
        assert_eq!(policy.flash_sale_think_spread_ms, u64::MAX);
        assert_eq!(policy.think_time(UserId::new(7)), Duration::MAX);
    }
}
