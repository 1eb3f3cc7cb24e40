//! Error types for the recovery registry
//!
//! Every failure is synchronous and deterministic for a given state and
//! input, and aborts the whole operation with no partial state change.

use crate::core_activation::signature::SignatureError;
use crate::core_registry::address::Address;
use thiserror::Error;

/// Result alias for registry operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Errors that can occur in the recovery registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    /// The caller already has an active record
    #[error("identity is already registered")]
    AlreadyExists,

    /// No active record exists for the address
    #[error("no active record for {0}")]
    NotFound(Address),

    /// The main key is the null identity
    #[error("main key must not be the zero address")]
    InvalidMainKey,

    /// The backup key is the null identity or collides with the main key
    #[error("backup key must be non-zero and distinct from the main key")]
    InvalidBackupKey,

    /// An identity cannot be its own recovery partner
    #[error("cannot bind an identity to itself")]
    SelfBindingNotAllowed,

    /// One of the two sides is already bound; binding is one-shot
    #[error("{0} is already bound to a partner")]
    AlreadyBound(Address),

    /// Caller and target are not mutually bound partners
    #[error("caller and target are not mutual partners")]
    PartnerNotBound,

    /// The recovered signer is not the target's current main key
    #[error("signature was not produced by the target's main key")]
    InvalidSignature,

    /// The signature bytes could not be decoded or recovered from
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

impl From<SignatureError> for RecoveryError {
    fn from(err: SignatureError) -> Self {
        RecoveryError::MalformedSignature(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_error_converts_to_malformed() {
        let err: RecoveryError = SignatureError::InvalidLength(12).into();
        assert!(matches!(err, RecoveryError::MalformedSignature(_)));
        assert!(err.to_string().contains("malformed signature"));
    }

    #[test]
    fn test_not_found_names_the_address() {
        let mut bytes = [0u8; 20];
        bytes[19] = 0xAA;
        let err = RecoveryError::NotFound(Address::new(bytes));
        assert!(err.to_string().contains("0x"));
    }
}
