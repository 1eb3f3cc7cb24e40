//! Address module
//!
//! Defines the 20-byte identity address and the execution-context identifier.
//! Addresses are derived from a secp256k1 public key the same way external
//! signers derive theirs, so a recovered signer can be compared against
//! stored credentials directly.

use crate::core_activation::digest::keccak256;
use k256::ecdsa::VerifyingKey;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Address length in bytes
pub const ADDRESS_LEN: usize = 20;

/// Context identifier length in bytes
pub const CONTEXT_ID_LEN: usize = 32;

/// A 20-byte identity address.
///
/// The all-zero address is the null identity and is rejected wherever a
/// credential is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null identity
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    /// Derive the address of a secp256k1 public key:
    /// last 20 bytes of keccak256 over the uncompressed curve point (x || y)
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[12..]);
        Address(bytes)
    }

    /// Whether this is the null identity
    pub fn is_zero(&self) -> bool {
        *self == Address::ZERO
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Render as a 0x-prefixed hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string, with or without the 0x prefix
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| format!("Invalid hex: {}", e))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(format!(
                "Address must be {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ));
        }
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

// Addresses serialize as hex strings so they can key JSON maps.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Opaque identifier scoping signatures to one deployment instance.
///
/// Bound into every activation digest so a signature produced for one
/// deployment cannot be replayed against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId([u8; CONTEXT_ID_LEN]);

impl ContextId {
    /// Create a context id from raw bytes
    pub fn new(bytes: [u8; CONTEXT_ID_LEN]) -> Self {
        ContextId(bytes)
    }

    /// Derive a context id from an operator-chosen label
    pub fn derive(label: &[u8]) -> Self {
        ContextId(keccak256(label))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; CONTEXT_ID_LEN] {
        &self.0
    }

    /// Parse from a hex string, with or without the 0x prefix
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| format!("Invalid hex: {}", e))?;
        if bytes.len() != CONTEXT_ID_LEN {
            return Err(format!(
                "Context id must be {} bytes, got {}",
                CONTEXT_ID_LEN,
                bytes.len()
            ));
        }
        let mut out = [0u8; CONTEXT_ID_LEN];
        out.copy_from_slice(&bytes);
        Ok(ContextId(out))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ContextId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextId::from_hex(s)
    }
}

impl Serialize for ContextId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContextId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContextId::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use rand_core::OsRng;

    #[test]
    fn test_address_derivation_is_deterministic() {
        let key = SigningKey::random(&mut OsRng);
        let addr1 = Address::from_public_key(key.verifying_key());
        let addr2 = Address::from_public_key(key.verifying_key());
        assert_eq!(addr1, addr2);
        assert!(!addr1.is_zero());
    }

    #[test]
    fn test_address_different_keys() {
        let addr1 = Address::from_public_key(SigningKey::random(&mut OsRng).verifying_key());
        let addr2 = Address::from_public_key(SigningKey::random(&mut OsRng).verifying_key());
        assert_ne!(addr1, addr2);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::new([0xAB; ADDRESS_LEN]);
        let s = addr.to_hex();
        assert!(s.starts_with("0x"));
        assert_eq!(Address::from_hex(&s).unwrap(), addr);
        // 0x prefix is optional on input
        assert_eq!(Address::from_hex(&s[2..]).unwrap(), addr);
    }

    #[test]
    fn test_address_rejects_bad_hex() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("not hex").is_err());
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address::new([1; ADDRESS_LEN]).is_zero());
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let addr = Address::new([0x11; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_context_id_derive_is_deterministic() {
        let a = ContextId::derive(b"deployment-1");
        let b = ContextId::derive(b"deployment-1");
        let c = ContextId::derive(b"deployment-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_context_id_hex_roundtrip() {
        let ctx = ContextId::derive(b"roundtrip");
        let parsed = ContextId::from_hex(&ctx.to_string()).unwrap();
        assert_eq!(ctx, parsed);
    }
}
