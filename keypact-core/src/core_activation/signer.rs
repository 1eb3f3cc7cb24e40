//! Local activation signer
//!
//! A secp256k1 keypair that produces activation signatures. This is the
//! in-process realization of the off-system signing collaborator: a party
//! that holds their main key locally (the CLI, tests) signs with this; a
//! remote signer reproduces the same digest bytes independently.

use crate::core_activation::digest::{activation_digest, signed_message_digest};
use crate::core_activation::signature::{RecoverableSignature, SignatureError};
use crate::core_registry::address::{Address, ContextId};
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use rand_core::OsRng;
use std::fmt;

/// secp256k1 signing keypair.
///
/// The secret scalar lives inside `SigningKey`, which zeroizes on drop.
pub struct ActivationSigner {
    signing_key: SigningKey,
}

impl ActivationSigner {
    /// Generate a fresh keypair from OS randomness
    pub fn generate() -> Self {
        ActivationSigner {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Rebuild a signer from a stored 32-byte secret scalar
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| SignatureError::InvalidScalar)?;
        Ok(ActivationSigner { signing_key })
    }

    /// The 32-byte secret scalar, for keystore persistence
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// The public half of the keypair
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The address this signer's signatures recover to
    pub fn address(&self) -> Address {
        Address::from_public_key(self.verifying_key())
    }

    /// Sign a 32-byte prehashed message, returning the canonical low-s
    /// signature with its recovery id
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, SignatureError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|_| SignatureError::SigningFailed)?;

        // normalize to low-s; flipping s negates the recovered y parity
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };
        Ok(RecoverableSignature::from_parts(&signature, recovery_id))
    }

    /// Sign the activation of `target` in `context`: the personal-message
    /// form of the activation digest, exactly what the registry verifies
    pub fn sign_activation(
        &self,
        target: &Address,
        context: &ContextId,
    ) -> Result<RecoverableSignature, SignatureError> {
        let digest = activation_digest(target, context);
        self.sign_prehash(&signed_message_digest(&digest))
    }
}

impl fmt::Debug for ActivationSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key material
        write!(f, "ActivationSigner({})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_roundtrip_preserves_address() {
        let signer = ActivationSigner::generate();
        let restored = ActivationSigner::from_secret_bytes(&signer.secret_bytes()).unwrap();
        assert_eq!(signer.address(), restored.address());
    }

    #[test]
    fn test_rejects_invalid_secret() {
        assert!(ActivationSigner::from_secret_bytes(&[0u8; 32]).is_err());
        assert!(ActivationSigner::from_secret_bytes(&[1u8; 16]).is_err());
    }

    #[test]
    fn test_activation_signature_recovers_to_signer() {
        let signer = ActivationSigner::generate();
        let ctx = ContextId::derive(b"signer-tests");
        let target = Address::new([7u8; 20]);

        let sig = signer.sign_activation(&target, &ctx).unwrap();
        let digest = activation_digest(&target, &ctx);
        let prehash = signed_message_digest(&digest);
        assert_eq!(sig.recover_address(&prehash).unwrap(), signer.address());
    }

    #[test]
    fn test_signature_is_context_specific() {
        let signer = ActivationSigner::generate();
        let target = Address::new([7u8; 20]);
        let sig = signer
            .sign_activation(&target, &ContextId::derive(b"ctx-a"))
            .unwrap();

        let other_digest = activation_digest(&target, &ContextId::derive(b"ctx-b"));
        let other_prehash = signed_message_digest(&other_digest);
        // over the wrong context the signature does not recover to the signer
        match sig.recover_address(&other_prehash) {
            Ok(recovered) => assert_ne!(recovered, signer.address()),
            Err(_) => {}
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = ActivationSigner::generate();
        let rendered = format!("{:?}", signer);
        assert!(rendered.contains("ActivationSigner"));
        assert!(!rendered.contains(&hex::encode(signer.secret_bytes())));
    }
}
