//! KeyPact core library
//!
//! Mutual backup-key recovery between two bound partners. Each registered
//! identity carries a primary and a backup credential; its bound partner can
//! swap the two by submitting a recoverable secp256k1 signature produced by
//! the identity's *current* primary key over a domain-separated,
//! context-bound digest.

pub mod config;
pub mod core_activation;
pub mod core_registry;
pub mod logging;
pub mod metrics;

pub use config::{Config, ConfigError};
pub use core_activation::{
    activation_digest, signed_message_digest, ActivationSigner, RecoverableSignature,
    SignatureError,
};
pub use core_registry::{
    Address, ContextId, EventLog, MemoryStore, RecoveryError, RecoveryEvent, RecoveryRegistry,
    RecoveryResult, User, UserStore,
};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogLevel};
pub use metrics::init_metrics;
