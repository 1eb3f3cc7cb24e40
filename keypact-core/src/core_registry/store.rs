//! Store module
//!
//! Abstract access to User records. The registry is written against the
//! `UserStore` trait so the authoritative table can live in any transactional
//! key-value backend; `MemoryStore` is the in-process default.

use crate::core_registry::address::Address;
use crate::core_registry::user::User;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Atomic per-call access to the User table.
///
/// Each `get`/`put` is a single indivisible operation; callers that need
/// multi-record atomicity hold the store exclusively for the duration of
/// the compound operation.
pub trait UserStore {
    /// Fetch the record for an address, if one exists
    fn get(&self, address: &Address) -> Option<User>;

    /// Insert or overwrite the record for an address
    fn put(&mut self, address: Address, user: User);
}

/// In-memory User table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    users: HashMap<Address, User>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserStore for MemoryStore {
    fn get(&self, address: &Address) -> Option<User> {
        self.users.get(address).copied()
    }

    fn put(&mut self, address: Address, user: User) {
        self.users.insert(address, user);
    }
}
