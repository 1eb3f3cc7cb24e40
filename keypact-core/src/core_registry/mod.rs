/*
    core_registry - Identity records and the recovery state machine

    The authoritative state layer for mutual backup-key recovery.
    Handles:
    - Identity addresses and the execution-context identifier
    - User records (main key, backup key, partner binding)
    - The store abstraction and the in-memory default
    - The append-only recovery event log
    - The registry service exposing register / bind / update / read / activate
*/

pub mod address;
pub mod errors;
pub mod events;
pub mod registry;
pub mod store;
pub mod user;

#[cfg(test)]
pub mod tests;

pub use address::{Address, ContextId};
pub use errors::{RecoveryError, RecoveryResult};
pub use events::{EventLog, RecoveryEvent};
pub use registry::RecoveryRegistry;
pub use store::{MemoryStore, UserStore};
pub use user::User;
