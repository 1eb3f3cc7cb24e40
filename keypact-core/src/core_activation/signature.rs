//! Recoverable signature module
//!
//! Detached secp256k1 signatures carrying a recovery id, encoded on the
//! wire as 65 bytes of `r || s || v`. Verification is recovery-based: the
//! signer's public key is recovered from the signature and reduced to an
//! address, which the registry compares against the target's main key.

use crate::core_registry::address::Address;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire length of a recoverable signature: 32-byte r, 32-byte s, 1-byte v
pub const SIGNATURE_LEN: usize = 65;

/// Errors raised while decoding or recovering from a signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Wrong byte length for the r || s || v encoding
    #[error("signature must be {SIGNATURE_LEN} bytes, got {0}")]
    InvalidLength(usize),

    /// r or s is zero or not a canonical field scalar
    #[error("invalid signature scalar encoding")]
    InvalidScalar,

    /// v is not one of 0, 1, 27, 28
    #[error("unknown recovery id {0}")]
    InvalidRecoveryId(u8),

    /// s is in the upper half of the curve order (malleable form)
    #[error("non-canonical signature: high s value")]
    NonCanonical,

    /// No public key could be recovered over the given digest
    #[error("public key recovery failed")]
    RecoveryFailed,

    /// Signing failed (key material unusable for this digest)
    #[error("signing failed")]
    SigningFailed,

    /// Hex input could not be decoded
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// A detached secp256k1 signature with recovery information.
///
/// Only the canonical low-s form is accepted; the malleable high-s twin of
/// a valid signature is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    r: [u8; 32],
    s: [u8; 32],
    // normalized recovery id (0..=3)
    v: u8,
}

impl RecoverableSignature {
    /// Parse the 65-byte `r || s || v` encoding.
    ///
    /// `v` is accepted in both the raw (0/1) and offset (27/28) forms
    /// external signers produce, and stored normalized.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let v = match bytes[64] {
            0 | 27 => 0,
            1 | 28 => 1,
            other => return Err(SignatureError::InvalidRecoveryId(other)),
        };
        let signature =
            Signature::from_slice(&bytes[..64]).map_err(|_| SignatureError::InvalidScalar)?;
        if signature.normalize_s().is_some() {
            return Err(SignatureError::NonCanonical);
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(RecoverableSignature { r, s, v })
    }

    /// Parse from a hex string, with or without the 0x prefix
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Encode as 65 bytes. `v` is emitted in the offset form (27/28)
    /// external personal-message signers use.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v + 27;
        out
    }

    /// Recover the signer's address from this signature over a 32-byte
    /// prehashed message
    pub fn recover_address(&self, prehash: &[u8; 32]) -> Result<Address, SignatureError> {
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        let signature =
            Signature::from_slice(&compact).map_err(|_| SignatureError::InvalidScalar)?;
        let recovery_id =
            RecoveryId::from_byte(self.v).ok_or(SignatureError::InvalidRecoveryId(self.v))?;
        let key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|_| SignatureError::RecoveryFailed)?;
        Ok(Address::from_public_key(&key))
    }

    pub(crate) fn from_parts(signature: &Signature, recovery_id: RecoveryId) -> Self {
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        RecoverableSignature {
            r,
            s,
            v: recovery_id.to_byte(),
        }
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for RecoverableSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecoverableSignature::from_hex(s)
    }
}
