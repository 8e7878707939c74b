//! Checkout orchestration: turns carts into orders while protecting inventory.

pub mod book;
pub mod order;
pub mod service;
pub mod strategy;

pub use book::{CheckoutStats, OrderBook};
pub use order::{Order, OrderItem, OrderSource, OrderStatus};
pub use service::{CheckoutRequest, CheckoutService};
pub use strategy::{CheckoutStrategy, Strategy};
