//! Poison-tolerant access to the in-process store's entry table.
//!
//! A panic while holding the lock leaves the table usable: the worst case is a
//! half-applied write to one entry, which its TTL clears anyway.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read()
        .unwrap_or_else(|poisoned| recover(poisoned, source, op, "read"))
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write()
        .unwrap_or_else(|poisoned| recover(poisoned, source, op, "write"))
}

fn recover<G>(
    poisoned: PoisonError<G>,
    source: &'static str,
    op: &'static str,
    mode: &'static str,
) -> G {
    warn!(
        source,
        op,
        mode,
        "cache entry lock was poisoned; continuing with current entries"
    );
    poisoned.into_inner()
}
