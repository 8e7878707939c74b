//! Lock access shared by the stores.
//!
//! A writer that panics mid-operation poisons a `std::sync::RwLock`. The stores
//! recover the guard instead of failing every later call: each store mutation
//! either completes its write or returns before touching state.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering poisoned lock (read)");
        poisoned.into_inner()
    })
}

pub fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering poisoned lock (write)");
        poisoned.into_inner()
    })
}
