//! # Compliance Proof Types
//!
//! The proof submission record and the verifier's answer. A
//! `ComplianceProof` is created off-ledger by the prover, submitted once,
//! and never mutated; the digest in `proof_hash` uniquely identifies the
//! artifact and is the unit of replay protection.

use serde::{Deserialize, Serialize};

use covenant_core::{AccountId, Digest32, Timestamp};

/// A compliance proof bound to a user account.
///
/// Immutable after creation. Absence of a proof is expressed as
/// `Option<ComplianceProof>` at call sites — there is no reserved
/// "empty" hash value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceProof {
    /// Digest uniquely identifying this proof artifact.
    pub proof_hash: Digest32,
    /// Opaque public inputs the proof was generated over.
    pub public_inputs: Vec<u8>,
    /// When the proof was created by the prover.
    pub timestamp: Timestamp,
    /// The account the proof is bound to.
    pub user: AccountId,
}

/// The outcome of a read-only verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the proof checked out against the stored compliance hash.
    pub is_valid: bool,
    /// The stored compliance hash consulted, when one exists. `None` when
    /// the proof was expired or the user has no stored hash.
    pub verified_hash: Option<Digest32>,
}

impl Verdict {
    /// A failed verification with no hash to report.
    pub fn rejected() -> Self {
        Self {
            is_valid: false,
            verified_hash: None,
        }
    }
}
