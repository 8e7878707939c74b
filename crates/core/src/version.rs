//! Optimistic concurrency primitives.

use crate::error::{DomainError, DomainResult};

/// A record whose accepted mutations are counted.
///
/// The version strictly increases by exactly 1 per accepted mutation and is
/// the admission gate for optimistic writers.
pub trait Versioned {
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation: the version the caller last observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedVersion(pub u64);

impl ExpectedVersion {
    pub fn of<T: Versioned + ?Sized>(record: &T) -> Self {
        Self(record.version())
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }

    /// Fails with `VersionConflict` unless `record` is still at the expected version.
    pub fn check<T: Versioned + ?Sized>(self, record: &T) -> DomainResult<()> {
        let actual = record.version();
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::VersionConflict {
                expected: self.0,
                actual,
            })
        }
    }
}

impl From<u64> for ExpectedVersion {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
