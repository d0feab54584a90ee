//! Extension trait to ignore lock poisoning.
//!
//! The grant stores keep plain values behind their locks, so a panic in another thread never
//! leaves them half-updated. This trait replaces `.read().unwrap_or_else(|e| e.into_inner())`
//! with a readable call.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait IgnorePoison<T> {
    /// Acquires a read guard, ignoring poison.
    fn read_ignore_poison(&self) -> RwLockReadGuard<'_, T>;

    /// Acquires a write guard, ignoring poison.
    fn write_ignore_poison(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> IgnorePoison<T> for RwLock<T> {
    fn read_ignore_poison(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_ignore_poison(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|e| e.into_inner())
    }
}
