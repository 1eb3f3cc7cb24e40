//! User record module
//!
//! The per-address identity record the registry maintains.

use crate::core_registry::address::Address;
use serde::{Deserialize, Serialize};

/// Identity record, one per registered address.
///
/// `main_key` and `backup_key` are always distinct and never the null
/// identity for an active record. The default record (zero keys, inactive,
/// no partner) is what reads of unregistered addresses return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// Identity currently trusted as the primary credential
    pub main_key: Address,

    /// Standby credential promoted by a successful activation
    pub backup_key: Address,

    /// Whether this identity has completed registration
    pub is_active: bool,

    /// Bound recovery partner, `None` until `bind_partner` succeeds
    pub mutual_partner: Option<Address>,
}

impl User {
    /// Create a freshly registered record: active, no partner yet
    pub fn new(main_key: Address, backup_key: Address) -> Self {
        User {
            main_key,
            backup_key,
            is_active: true,
            mutual_partner: None,
        }
    }

    /// Whether this record's partner pointer names `other`
    pub fn is_bound_to(&self, other: &Address) -> bool {
        self.mutual_partner == Some(*other)
    }

    /// Exchange the primary and backup credentials in place.
    /// The demoted key stays on the record, so the swap can be reversed
    /// by a later activation.
    pub fn swap_keys(&mut self) {
        std::mem::swap(&mut self.main_key, &mut self.backup_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = byte;
        Address::new(bytes)
    }

    #[test]
    fn test_default_record_is_zero_valued() {
        let user = User::default();
        assert!(user.main_key.is_zero());
        assert!(user.backup_key.is_zero());
        assert!(!user.is_active);
        assert_eq!(user.mutual_partner, None);
    }

    #[test]
    fn test_new_record_is_active_and_unbound() {
        let user = User::new(addr(1), addr(2));
        assert!(user.is_active);
        assert_eq!(user.mutual_partner, None);
        assert!(!user.is_bound_to(&addr(3)));
    }

    #[test]
    fn test_swap_keys_exchanges_only_the_keys() {
        let mut user = User::new(addr(1), addr(2));
        user.mutual_partner = Some(addr(9));
        user.swap_keys();
        assert_eq!(user.main_key, addr(2));
        assert_eq!(user.backup_key, addr(1));
        assert!(user.is_active);
        assert_eq!(user.mutual_partner, Some(addr(9)));
    }
}
