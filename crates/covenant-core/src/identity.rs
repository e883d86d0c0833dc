//! # Ledger Account Identifiers
//!
//! Newtype wrapper for the 20-byte account addresses of the host ledger.
//! Users, administrators, attestation operators, and FHE coprocessors are
//! all identified by `AccountId`; authorization is a comparison between
//! the transaction caller and a stored role holder.
//!
//! ## Security Invariant
//!
//! Identity is type-level: an `AccountId` cannot be confused with a digest
//! or request identifier, preventing cross-namespace substitution.

use serde::{Deserialize, Serialize};

/// A 20-byte ledger account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// Construct an account identifier from raw address bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Access the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render the address as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "acct:{}", self.to_hex())
    }
}
