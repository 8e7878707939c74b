//! `flashcart-core`: shared building blocks for the checkout core.
//!
//! This crate contains **pure domain** primitives (identifiers, money, the
//! error model) plus the small amount of shared machinery every store needs:
//! optimistic version checks, the injectable delay policy, pagination and
//! poison-tolerant lock access.

pub mod delay;
pub mod error;
pub mod id;
pub mod money;
pub mod page;
pub mod sync;
pub mod version;

pub use delay::{DelayPolicy, DelaySite};
pub use error::{DomainError, DomainResult, Resource, Retry};
pub use id::{CartId, OrderId, ProductId, UserId};
pub use money::Money;
pub use page::{Page, PageRequest};
pub use version::{ExpectedVersion, Versioned};
