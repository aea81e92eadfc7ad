//! Per-service mapping from client address to the token currently issued to it.
//!
//! Each service owns exactly one table; the authorization and content tables
//! are never shared or synchronised with each other.  A single mutex guards
//! every read and write.  Critical sections are one map operation long and
//! never span an `.await`, so a plain `std::sync::Mutex` is the right tool.
//!
//! Entries are never evicted: a new token for an address replaces the old
//! one, and the table lives as long as the owning service.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe `client address → token` map.
///
/// # Examples
///
/// ```rust
/// use fortune_core::SessionTable;
///
/// let table = SessionTable::new();
/// table.put("127.0.0.1:2020", 7);
/// table.put("127.0.0.1:2020", 9); // last write wins
/// assert_eq!(table.get("127.0.0.1:2020"), Some(9));
/// assert_eq!(table.get("127.0.0.1:2021"), None);
/// ```
#[derive(Debug, Default)]
pub struct SessionTable {
    entries: Mutex<HashMap<String, i64>>,
}

impl SessionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `token` to `addr`, replacing any token issued earlier.
    pub fn put(&self, addr: impl Into<String>, token: i64) {
        self.lock().insert(addr.into(), token);
    }

    /// Returns the token bound to `addr`, if any.
    pub fn get(&self, addr: &str) -> Option<i64> {
        self.lock().get(addr).copied()
    }

    /// Number of addresses with a live token.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is a single map call, so a panic elsewhere can
    // never leave the map half-updated; recovering from poison is sound.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
