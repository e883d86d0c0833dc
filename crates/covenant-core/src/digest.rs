//! # 32-Byte Content Digests
//!
//! Defines `Digest32`, the digest type used for compliance hashes, proof
//! fingerprints, verification request identifiers, and correctness proofs.
//!
//! ## Security Invariant
//!
//! A `Digest32` is always the output of SHA-256 over a fixed,
//! order-sensitive encoding assembled by the owning component. There is no
//! reserved "empty" digest value: code that needs to express absence uses
//! `Option<Digest32>`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
///
/// Used as the compliance hash, the proof fingerprint, and (wrapped in
/// component-specific newtypes) as request identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute the SHA-256 digest of a byte string.
pub fn sha256(data: &[u8]) -> Digest32 {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    Digest32(bytes)
}

/// Incremental SHA-256 over a sequence of fields.
///
/// Components that derive identifiers from several values (user address,
/// proof hash, ordinal, ...) feed each field in declaration order. The
/// encoding is order-sensitive: swapping two fields produces a different
/// digest.
#[derive(Debug, Default)]
pub struct DigestBuilder(Sha256);

impl DigestBuilder {
    /// Start a new digest computation.
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Fold a field into the digest.
    pub fn field(mut self, bytes: &[u8]) -> Self {
        self.0.update(bytes);
        self
    }

    /// Finish and produce the digest.
    pub fn finish(self) -> Digest32 {
        let hash = self.0.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Digest32(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_deterministic() {
        let d1 = sha256(b"covenant");
        let d2 = sha256(b"covenant");
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_different_inputs_different_digests() {
        assert_ne!(sha256(b"a"), sha256(b"b"));
    }

    #[test]
    fn test_known_sha256_vector() {
        // SHA256("") — verified against Python hashlib.sha256(b"").hexdigest()
        assert_eq!(
            sha256(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_display_format() {
        let s = format!("{}", sha256(b"x"));
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn test_builder_matches_concatenation() {
        let built = DigestBuilder::new().field(b"ab").field(b"cd").finish();
        assert_eq!(built, sha256(b"abcd"));
    }

    #[test]
    fn test_builder_field_order_sensitive() {
        let ab = DigestBuilder::new().field(b"ab").field(b"cd").finish();
        let ba = DigestBuilder::new().field(b"cd").field(b"ab").finish();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_serde_roundtrip() {
        let d = sha256(b"roundtrip");
        let json = serde_json::to_string(&d).unwrap();
        let parsed: Digest32 = serde_json::from_str(&json).unwrap();
        assert_eq!(d, parsed);
    }
}
