//! Activation digest module
//!
//! Builds the byte sequence an off-system signer must sign to authorize an
//! activation. The digest binds a fixed domain tag, the target address, and
//! the execution-context id, so a signature authorizes exactly one action on
//! one target in one deployment.
//!
//! The digest carries no per-user nonce: a signature over the same target
//! and context stays valid if the signing key ever becomes the target's
//! main key again after a swap-and-swap-back cycle.

use crate::core_registry::address::{Address, ContextId};
use sha3::{Digest, Keccak256};

/// Domain tag bound into every activation digest
pub const ACTIVATION_DOMAIN_TAG: &[u8] = b"ACTIVATE_BACKUP";

/// Personal-message prefix wrapped around a 32-byte digest before signing,
/// so the signature cannot double as authorization for anything else
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// keccak256 over arbitrary input
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the activation digest for a target in an execution context:
/// keccak256(tag || target || context_id).
///
/// Pure and side-effect-free. Field order and encoding are fixed; a remote
/// signer reproduces this byte for byte.
pub fn activation_digest(target: &Address, context: &ContextId) -> [u8; 32] {
    let mut payload =
        Vec::with_capacity(ACTIVATION_DOMAIN_TAG.len() + target.as_bytes().len() + 32);
    payload.extend_from_slice(ACTIVATION_DOMAIN_TAG);
    payload.extend_from_slice(target.as_bytes());
    payload.extend_from_slice(context.as_bytes());
    keccak256(&payload)
}

/// Wrap a 32-byte digest in the personal-message form that signers actually
/// sign: keccak256(prefix || digest)
pub fn signed_message_digest(digest: &[u8; 32]) -> [u8; 32] {
    let mut payload = Vec::with_capacity(SIGNED_MESSAGE_PREFIX.len() + digest.len());
    payload.extend_from_slice(SIGNED_MESSAGE_PREFIX);
    payload.extend_from_slice(digest);
    keccak256(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(byte: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = byte;
        Address::new(bytes)
    }

    #[test]
    fn test_digest_is_deterministic() {
        let ctx = ContextId::derive(b"digest-tests");
        assert_eq!(
            activation_digest(&addr(1), &ctx),
            activation_digest(&addr(1), &ctx)
        );
    }

    #[test]
    fn test_digest_binds_target() {
        let ctx = ContextId::derive(b"digest-tests");
        assert_ne!(
            activation_digest(&addr(1), &ctx),
            activation_digest(&addr(2), &ctx)
        );
    }

    #[test]
    fn test_digest_binds_context() {
        let a = ContextId::derive(b"deployment-a");
        let b = ContextId::derive(b"deployment-b");
        assert_ne!(activation_digest(&addr(1), &a), activation_digest(&addr(1), &b));
    }

    #[test]
    fn test_signed_message_form_differs_from_raw_digest() {
        let ctx = ContextId::derive(b"digest-tests");
        let digest = activation_digest(&addr(1), &ctx);
        assert_ne!(signed_message_digest(&digest), digest);
    }

    #[test]
    fn test_keccak256_known_vector() {
        // keccak256 of the empty input
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    proptest! {
        #[test]
        fn prop_digest_distinct_across_targets(
            a in any::<[u8; 20]>(),
            b in any::<[u8; 20]>(),
            ctx in any::<[u8; 32]>(),
        ) {
            prop_assume!(a != b);
            let ctx = ContextId::new(ctx);
            prop_assert_ne!(
                activation_digest(&Address::new(a), &ctx),
                activation_digest(&Address::new(b), &ctx)
            );
        }

        #[test]
        fn prop_digest_distinct_across_contexts(
            target in any::<[u8; 20]>(),
            ctx_a in any::<[u8; 32]>(),
            ctx_b in any::<[u8; 32]>(),
        ) {
            prop_assume!(ctx_a != ctx_b);
            let target = Address::new(target);
            prop_assert_ne!(
                activation_digest(&target, &ContextId::new(ctx_a)),
                activation_digest(&target, &ContextId::new(ctx_b))
            );
        }
    }
}
