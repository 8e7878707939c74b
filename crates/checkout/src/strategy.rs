use core::str::FromStr;

use serde::{Deserialize, Serialize};

use flashcart_cart::CartWriteMode;
use flashcart_core::{DomainError, ExpectedVersion};

/// Concurrency strategy selected by the caller (`mode=` on the request layer).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Unsafe,
    #[default]
    Safe,
    Optimistic,
    Batch,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Unsafe,
        Strategy::Safe,
        Strategy::Optimistic,
        Strategy::Batch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Unsafe => "unsafe",
            Strategy::Safe => "safe",
            Strategy::Optimistic => "optimistic",
            Strategy::Batch => "batch",
        }
    }

    /// Cart write mode for this strategy. Only `Optimistic` uses `expected`;
    /// `Batch` has no cart-level meaning and writes exclusively.
    pub fn cart_write_mode(self, expected: ExpectedVersion) -> CartWriteMode {
        match self {
            Strategy::Unsafe => CartWriteMode::Unsynchronized,
            Strategy::Safe | Strategy::Batch => CartWriteMode::Exclusive,
            Strategy::Optimistic => CartWriteMode::Optimistic(expected),
        }
    }

    pub fn checkout(self) -> CheckoutStrategy {
        match self {
            Strategy::Unsafe => CheckoutStrategy::Unsynchronized,
            Strategy::Safe => CheckoutStrategy::Safe,
            Strategy::Optimistic => CheckoutStrategy::Optimistic,
            Strategy::Batch => CheckoutStrategy::BatchReserve,
        }
    }
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown mode '{s}' (expected unsafe, safe, optimistic or batch)"
                ))
            })
    }
}

/// The order-creation path a checkout runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStrategy {
    /// Per-item check then unprotected decrement; can oversell.
    Unsynchronized,
    /// Check every item, then protected per-item decrements.
    Safe,
    /// Per-item decrement gated on the product version; compensates on conflict.
    Optimistic,
    /// One all-or-nothing reservation for the whole cart.
    BatchReserve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_modes() {
        assert_eq!("unsafe".parse::<Strategy>().unwrap(), Strategy::Unsafe);
        assert_eq!(" Batch ".parse::<Strategy>().unwrap(), Strategy::Batch);
        assert_eq!(Strategy::default(), Strategy::Safe);
        assert!(matches!(
            "locked".parse::<Strategy>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn maps_to_cart_and_checkout_paths() {
        let expected = ExpectedVersion(4);
        assert_eq!(
            Strategy::Optimistic.cart_write_mode(expected),
            CartWriteMode::Optimistic(expected)
        );
        assert_eq!(Strategy::Unsafe.cart_write_mode(expected), CartWriteMode::Unsynchronized);
        assert_eq!(Strategy::Batch.cart_write_mode(expected), CartWriteMode::Exclusive);
        assert_eq!(Strategy::Batch.checkout(), CheckoutStrategy::BatchReserve);
        assert_eq!(Strategy::Unsafe.to_string(), "unsafe");
    }
}
