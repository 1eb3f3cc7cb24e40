//! Recovery registry service
//!
//! Owns the User table and the event log, and exposes every public
//! operation: registration, partner binding, backup-key update, reads, and
//! signature-gated activation.
//!
//! All mutating operations take `&mut self`, so at most one mutation is in
//! flight at a time and each runs to completion as one indivisible unit.
//! Validation finishes before the first store write, which makes every
//! failure all-or-nothing.

use crate::core_activation::digest::{activation_digest, signed_message_digest};
use crate::core_activation::signature::RecoverableSignature;
use crate::core_registry::address::{Address, ContextId};
use crate::core_registry::errors::{RecoveryError, RecoveryResult};
use crate::core_registry::events::{EventLog, RecoveryEvent};
use crate::core_registry::store::{MemoryStore, UserStore};
use crate::core_registry::user::User;
use crate::metrics::{record_counter, Timer};
use tracing::{info, warn};

/// Registry of identity records and their recovery partnerships.
///
/// The caller identity is an explicit argument on every mutating operation:
/// it is the authenticated invoker, supplied by whatever transport fronts
/// this service.
pub struct RecoveryRegistry<S: UserStore = MemoryStore> {
    store: S,
    events: EventLog,
    context: ContextId,
}

impl RecoveryRegistry<MemoryStore> {
    /// Create a registry over an empty in-memory store
    pub fn new(context: ContextId) -> Self {
        Self::with_store(MemoryStore::new(), context)
    }
}

impl<S: UserStore> RecoveryRegistry<S> {
    /// Create a registry over an existing store with an empty event log
    pub fn with_store(store: S, context: ContextId) -> Self {
        Self::from_parts(store, EventLog::new(), context)
    }

    /// Reassemble a registry from a previously extracted store and log
    pub fn from_parts(store: S, events: EventLog, context: ContextId) -> Self {
        info!(context = %context, "initializing recovery registry");
        RecoveryRegistry {
            store,
            events,
            context,
        }
    }

    /// Tear the registry down into its store and event log, e.g. to persist
    /// them after a batch of operations
    pub fn into_parts(self) -> (S, EventLog) {
        (self.store, self.events)
    }

    /// The execution context this registry's signatures are scoped to
    pub fn context(&self) -> &ContextId {
        &self.context
    }

    /// The audit trail, oldest event first
    pub fn events(&self) -> &[RecoveryEvent] {
        self.events.events()
    }

    /// Create a record for `caller`.
    ///
    /// The record starts active with no partner. Re-registration of an
    /// active identity fails, so a record is created exactly once per
    /// address.
    pub fn register(
        &mut self,
        caller: Address,
        main_key: Address,
        backup_key: Address,
    ) -> RecoveryResult<()> {
        if self.store.get(&caller).is_some_and(|u| u.is_active) {
            return Err(RecoveryError::AlreadyExists);
        }
        if main_key.is_zero() {
            return Err(RecoveryError::InvalidMainKey);
        }
        if backup_key.is_zero() || backup_key == main_key {
            return Err(RecoveryError::InvalidBackupKey);
        }

        self.store.put(caller, User::new(main_key, backup_key));
        self.events.append(RecoveryEvent::UserRegistered {
            user: caller,
            main_key,
            backup_key,
        });
        record_counter("registry.users.registered", 1);
        info!(user = %caller, main_key = %main_key, backup_key = %backup_key, "registered identity");
        Ok(())
    }

    /// Mutually link `caller` and `partner`.
    ///
    /// Binding is one-shot: once either side has a partner, neither can be
    /// rebound, and no unbind operation exists. Both pointer writes happen
    /// inside this single exclusive call, so no reader ever observes one
    /// side bound without the other.
    pub fn bind_partner(&mut self, caller: Address, partner: Address) -> RecoveryResult<()> {
        let mut caller_rec = self.active(&caller)?;
        let mut partner_rec = self.active(&partner)?;
        if partner == caller {
            return Err(RecoveryError::SelfBindingNotAllowed);
        }
        if caller_rec.mutual_partner.is_some() {
            return Err(RecoveryError::AlreadyBound(caller));
        }
        if partner_rec.mutual_partner.is_some() {
            return Err(RecoveryError::AlreadyBound(partner));
        }

        caller_rec.mutual_partner = Some(partner);
        partner_rec.mutual_partner = Some(caller);
        self.store.put(caller, caller_rec);
        self.store.put(partner, partner_rec);
        self.events.append(RecoveryEvent::PartnerBound {
            user_a: caller,
            user_b: partner,
        });
        record_counter("registry.partners.bound", 1);
        info!(user_a = %caller, user_b = %partner, "bound recovery partners");
        Ok(())
    }

    /// Replace `caller`'s standby credential
    pub fn update_backup_key(
        &mut self,
        caller: Address,
        new_backup_key: Address,
    ) -> RecoveryResult<()> {
        let mut record = self.active(&caller)?;
        if new_backup_key.is_zero() || new_backup_key == record.main_key {
            return Err(RecoveryError::InvalidBackupKey);
        }

        record.backup_key = new_backup_key;
        self.store.put(caller, record);
        self.events.append(RecoveryEvent::BackupKeyUpdated {
            user: caller,
            new_backup_key,
        });
        record_counter("registry.backup_keys.updated", 1);
        info!(user = %caller, new_backup_key = %new_backup_key, "updated backup key");
        Ok(())
    }

    /// Read the record for an address.
    ///
    /// Pure read with no side effects. An unregistered address yields the
    /// zero-valued record rather than an error.
    pub fn get_details(&self, address: &Address) -> User {
        self.store.get(address).unwrap_or_default()
    }

    /// Swap `target`'s primary and backup credentials.
    ///
    /// Two-factor authorization: `caller` must be `target`'s mutually bound
    /// partner, and `signature` must have been produced by `target`'s
    /// *current* main key over the personal-message form of
    /// `activation_digest(target, context)`. Both partner pointers are
    /// checked; a one-sided pointer is not sufficient.
    ///
    /// The swap demotes the old main key to backup rather than erasing it,
    /// so the same mechanism can later swap back.
    pub fn activate(
        &mut self,
        caller: Address,
        target: Address,
        signature: &RecoverableSignature,
    ) -> RecoveryResult<()> {
        let _timer = Timer::new("registry.activate.duration_ms");

        let mut target_rec = self.active(&target)?;
        let caller_rec = self.active(&caller)?;
        if !(target_rec.is_bound_to(&caller) && caller_rec.is_bound_to(&target)) {
            warn!(caller = %caller, target = %target, "activation attempt without mutual binding");
            return Err(RecoveryError::PartnerNotBound);
        }

        let digest = activation_digest(&target, &self.context);
        let prehash = signed_message_digest(&digest);
        let signer = signature.recover_address(&prehash)?;
        if signer != target_rec.main_key {
            warn!(caller = %caller, target = %target, signer = %signer,
                "activation signature does not match the target's main key");
            return Err(RecoveryError::InvalidSignature);
        }

        let old_backup_key = target_rec.backup_key;
        target_rec.swap_keys();
        self.store.put(target, target_rec);
        self.events.append(RecoveryEvent::BackupKeyActivated {
            user: target,
            activated_by: caller,
            old_backup_key,
        });
        record_counter("registry.backup_keys.activated", 1);
        info!(user = %target, activated_by = %caller, old_backup_key = %old_backup_key,
            "activated backup key");
        Ok(())
    }

    fn active(&self, address: &Address) -> RecoveryResult<User> {
        match self.store.get(address) {
            Some(user) if user.is_active => Ok(user),
            _ => Err(RecoveryError::NotFound(*address)),
        }
    }
}
