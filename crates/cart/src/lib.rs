//! Shopping carts and the strategies for mutating them under contention.

pub mod cart;
pub mod store;

pub use cart::{Cart, CartItem, NewCartItem};
pub use store::{CartStore, CartWriteMode};
