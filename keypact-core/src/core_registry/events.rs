//! Recovery events
//!
//! Events appended by the registry for consumption by external monitoring
//! and UI. The log is an audit trail: the core writes it and never reads it
//! back.

use crate::core_registry::address::Address;
use serde::{Deserialize, Serialize};

/// Observable state changes, in the order they were applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryEvent {
    /// An identity completed registration
    UserRegistered {
        user: Address,
        main_key: Address,
        backup_key: Address,
    },

    /// Two identities became mutual recovery partners
    PartnerBound { user_a: Address, user_b: Address },

    /// A partner activated the user's backup key; the old backup is now
    /// the main key and `old_backup_key` records the pre-swap value
    BackupKeyActivated {
        user: Address,
        activated_by: Address,
        old_backup_key: Address,
    },

    /// The user replaced their standby credential
    BackupKeyUpdated {
        user: Address,
        new_backup_key: Address,
    },
}

/// Append-only event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<RecoveryEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        EventLog::default()
    }

    /// Append an event. There is no removal or mutation path.
    pub(crate) fn append(&mut self, event: RecoveryEvent) {
        self.events.push(event);
    }

    /// All events, oldest first
    pub fn events(&self) -> &[RecoveryEvent] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
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
    fn test_append_preserves_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.append(RecoveryEvent::UserRegistered {
            user: addr(1),
            main_key: addr(2),
            backup_key: addr(3),
        });
        log.append(RecoveryEvent::PartnerBound {
            user_a: addr(1),
            user_b: addr(4),
        });

        assert_eq!(log.len(), 2);
        assert!(matches!(
            log.events()[0],
            RecoveryEvent::UserRegistered { .. }
        ));
        assert!(matches!(log.events()[1], RecoveryEvent::PartnerBound { .. }));
    }

    #[test]
    fn test_event_log_json_roundtrip() {
        let mut log = EventLog::new();
        log.append(RecoveryEvent::BackupKeyActivated {
            user: addr(1),
            activated_by: addr(2),
            old_backup_key: addr(3),
        });

        let json = serde_json::to_string(&log).unwrap();
        let back: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.events(), log.events());
    }
}
