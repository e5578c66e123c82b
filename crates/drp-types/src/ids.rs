// Path: crates/drp-types/src/ids.rs
//! Newtypes over `String`/hex-hash identifiers.
//!
//! These are thin wrappers rather than raw `String`s so that a
//! `peer_id` can never be silently passed where an `ObjectId` or a
//! vertex hash is expected — the type system catches the mixup instead
//! of a unit test three layers away.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// A peer's stable network identity: the base58-check encoding of the
/// SHA-256 hash of its secp256k1 public key, minted in `drp-crypto`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Wraps an already-encoded peer id string.
    ///
    /// Validation here is limited to non-emptiness; the encoding's
    /// cryptographic shape is enforced where it is minted, in
    /// `drp-crypto`.
    pub fn new(s: impl Into<String>) -> Result<Self, TypesError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypesError::InvalidPeerId(s));
        }
        Ok(Self(s))
    }

    /// The underlying encoded string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PeerId> for String {
    fn from(id: PeerId) -> Self {
        id.0
    }
}

/// The identity of a replicated object: the hash of its creation
/// parameters, shared out-of-band to every peer that joins it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wraps an already-computed object id string.
    pub fn new(s: impl Into<String>) -> Result<Self, TypesError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypesError::InvalidPeerId(s));
        }
        Ok(Self(s))
    }

    /// The underlying encoded string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates that `s` is a 64-character lowercase hex string, i.e. the
/// shape of a SHA-256 content hash, or the root sentinel.
pub fn validate_hash(s: &str) -> Result<(), TypesError> {
    if s == drp_codec::ROOT_HASH {
        return Ok(());
    }
    let is_valid =
        s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
    if is_valid {
        Ok(())
    } else {
        Err(TypesError::InvalidHash(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_id_rejects_empty_string() {
        assert!(PeerId::new("").is_err());
    }

    #[test]
    fn peer_id_roundtrips_through_display() {
        let id = PeerId::new("2NEpo7TZRRrLZSi2U").unwrap();
        assert_eq!(format!("{id}"), "2NEpo7TZRRrLZSi2U");
    }

    #[test]
    fn root_hash_sentinel_validates() {
        assert!(validate_hash(drp_codec::ROOT_HASH).is_ok());
    }

    #[test]
    fn uppercase_hex_is_rejected() {
        let upper = "A".repeat(64);
        assert!(validate_hash(&upper).is_err());
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(validate_hash("deadbeef").is_err());
    }
}
