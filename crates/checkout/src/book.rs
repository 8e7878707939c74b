use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use flashcart_core::{sync, DomainError, DomainResult, OrderId, UserId};

use crate::order::Order;

/// Process-wide checkout counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutStats {
    pub total_orders: u64,
    /// Checkouts and flash-sale purchases refused for insufficient stock.
    pub failed_orders: u64,
    /// Batch reservations refused and optimistic checkouts that lost a race.
    pub race_conditions_detected: u64,
}

#[derive(Debug, Default)]
struct OrderIndex {
    orders: HashMap<OrderId, Order>,
    by_user: HashMap<UserId, Vec<OrderId>>,
}

/// Created orders plus the checkout counters.
///
/// Counters sit behind their own lock so that order inserts and counter
/// updates never wait on each other.
#[derive(Debug, Default)]
pub struct OrderBook {
    index: RwLock<OrderIndex>,
    stats: RwLock<CheckoutStats>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly created order and count it.
    pub(crate) fn record(&self, order: Order) -> Order {
        {
            let mut index = sync::write(&self.index);
            index.by_user.entry(order.user_id).or_default().push(order.id);
            index.orders.insert(order.id, order.clone());
        }
        sync::write(&self.stats).total_orders += 1;

        tracing::debug!(order_id = %order.id, user_id = %order.user_id, total = %order.total, "order recorded");
        order
    }

    pub(crate) fn record_failure(&self) {
        sync::write(&self.stats).failed_orders += 1;
    }

    pub(crate) fn record_race(&self) {
        sync::write(&self.stats).race_conditions_detected += 1;
    }

    pub fn stats(&self) -> CheckoutStats {
        *sync::read(&self.stats)
    }

    pub fn order(&self, id: OrderId) -> DomainResult<Order> {
        sync::read(&self.index)
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::order_not_found(id))
    }

    /// A user's orders, oldest first.
    pub fn orders_for_user(&self, user_id: UserId) -> Vec<Order> {
        let index = sync::read(&self.index);
        index
            .by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| index.orders.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        sync::read(&self.index).orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderSource;

    #[test]
    fn records_orders_per_user_in_creation_order() {
        let book = OrderBook::new();
        let first = book.record(Order::pending(UserId::new(1), Vec::new(), OrderSource::FlashSale));
        let second = book.record(Order::pending(UserId::new(1), Vec::new(), OrderSource::FlashSale));
        book.record(Order::pending(UserId::new(2), Vec::new(), OrderSource::FlashSale));

        let ids: Vec<_> = book.orders_for_user(UserId::new(1)).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(book.orders_for_user(UserId::new(3)).is_empty());
        assert_eq!(book.order(first.id).unwrap(), first);
        assert_eq!(book.stats().total_orders, 3);
    }

    #[test]
    fn unknown_order_is_not_found() {
        let book = OrderBook::new();
        let id = OrderId::new();
        assert_eq!(book.order(id), Err(DomainError::order_not_found(id)));
    }

    #[test]
    fn counters_are_independent() {
        let book = OrderBook::new();
        book.record_failure();
        book.record_failure();
        book.record_race();
        assert_eq!(
            book.stats(),
            CheckoutStats {
                total_orders: 0,
                failed_orders: 2,
                race_conditions_detected: 1,
            }
        );
    }
}
