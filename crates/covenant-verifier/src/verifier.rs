//! # Proof Verifier
//!
//! Holds the per-user compliance hash table and the global used-proof
//! ledger, and answers direct verification queries.
//!
//! ## Side-Effect Contract
//!
//! [`ProofVerifier::verify_proof()`] is read-only so callers can query it
//! idempotently; [`ProofVerifier::verify_and_record()`] performs the
//! one-time "mark used" in the same atomic operation as the acceptance.
//! Replay protection is global across accounts: a proof hash identifies
//! one artifact, so a hash consumed by any account is consumed for all.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use covenant_core::{AccountId, Digest32, Timestamp, TxContext};

use crate::proof::{ComplianceProof, Verdict};

/// Default proof acceptance window: 30 days.
pub const PROOF_EXPIRATION_SECS: u64 = 30 * 24 * 60 * 60;

/// Errors raised by the proof verifier.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifierError {
    /// The proof hash was already consumed, by any account.
    #[error("proof already used: {0}")]
    ProofAlreadyUsed(Digest32),

    /// The proof timestamp is outside the acceptance window.
    #[error("proof expired: created {created}, window {window_secs}s")]
    ProofExpired {
        /// When the proof was created.
        created: Timestamp,
        /// The acceptance window that was exceeded.
        window_secs: u64,
    },

    /// Caller is not the verifier admin.
    #[error("unauthorized: {0} is not the verifier admin")]
    Unauthorized(AccountId),

    /// Batched admin write received collections of different lengths.
    #[error("batch length mismatch: {users} users, {hashes} hashes, {flags} flags")]
    BatchLengthMismatch {
        /// Number of user entries supplied.
        users: usize,
        /// Number of hash entries supplied.
        hashes: usize,
        /// Number of flag entries supplied.
        flags: usize,
    },
}

/// A user's stored compliance attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCompliance {
    /// Content hash of the user's compliance data.
    pub hash: Digest32,
    /// Whether the attestation asserts compliance.
    pub is_compliant: bool,
}

/// The direct proof verification backend.
#[derive(Debug)]
pub struct ProofVerifier {
    compliance: HashMap<AccountId, UserCompliance>,
    used_proofs: HashSet<Digest32>,
    admin: AccountId,
    proof_expiration_secs: u64,
}

impl ProofVerifier {
    /// Create a verifier with the default 30-day acceptance window.
    pub fn new(admin: AccountId) -> Self {
        Self {
            compliance: HashMap::new(),
            used_proofs: HashSet::new(),
            admin,
            proof_expiration_secs: PROOF_EXPIRATION_SECS,
        }
    }

    /// Read-only verification of a proof against an expected data hash.
    ///
    /// Invalid when the proof is outside the acceptance window or the
    /// user has no stored compliance hash; otherwise valid iff the stored
    /// hash equals `expected_hash`. The stored hash is reported whenever
    /// one was consulted, so callers can inspect a mismatch.
    ///
    /// Performs no replay bookkeeping — that is the caller's job (or use
    /// [`ProofVerifier::verify_and_record()`]).
    pub fn verify_proof(
        &self,
        proof: &ComplianceProof,
        expected_hash: Digest32,
        now: Timestamp,
    ) -> Verdict {
        if !now.within_window(proof.timestamp, self.proof_expiration_secs) {
            return Verdict::rejected();
        }
        match self.compliance.get(&proof.user) {
            None => Verdict::rejected(),
            Some(stored) => Verdict {
                is_valid: stored.hash == expected_hash,
                verified_hash: Some(stored.hash),
            },
        }
    }

    /// Verification plus one-time consumption of the proof hash.
    ///
    /// Rejects with [`VerifierError::ProofAlreadyUsed`] when the hash was
    /// consumed by any prior call, and [`VerifierError::ProofExpired`]
    /// when outside the window. On a valid proof the hash is marked used
    /// in the same operation and a verified event is emitted; an invalid
    /// proof returns `Ok(false)` and consumes nothing.
    pub fn verify_and_record(
        &mut self,
        ctx: TxContext,
        proof: &ComplianceProof,
        expected_hash: Digest32,
    ) -> Result<bool, VerifierError> {
        if self.used_proofs.contains(&proof.proof_hash) {
            return Err(VerifierError::ProofAlreadyUsed(proof.proof_hash));
        }
        if !ctx.now.within_window(proof.timestamp, self.proof_expiration_secs) {
            return Err(VerifierError::ProofExpired {
                created: proof.timestamp,
                window_secs: self.proof_expiration_secs,
            });
        }
        let verdict = self.verify_proof(proof, expected_hash, ctx.now);
        if verdict.is_valid {
            self.used_proofs.insert(proof.proof_hash);
            tracing::info!(
                target: "covenant::verifier",
                user = %proof.user,
                proof_hash = %proof.proof_hash,
                "proof verified and consumed"
            );
        }
        Ok(verdict.is_valid)
    }

    /// The stored compliance hash for a user, if any.
    pub fn user_compliance_hash(&self, user: AccountId) -> Option<Digest32> {
        self.compliance.get(&user).map(|c| c.hash)
    }

    /// Whether the user's stored attestation asserts compliance.
    pub fn is_user_compliant(&self, user: AccountId) -> bool {
        self.compliance.get(&user).is_some_and(|c| c.is_compliant)
    }

    /// Whether a proof hash has been consumed.
    pub fn is_proof_used(&self, hash: Digest32) -> bool {
        self.used_proofs.contains(&hash)
    }

    /// Admin: seed or overwrite one account's compliance attestation.
    pub fn set_user_compliance(
        &mut self,
        ctx: TxContext,
        user: AccountId,
        hash: Digest32,
        is_compliant: bool,
    ) -> Result<(), VerifierError> {
        self.require_admin(ctx.caller)?;
        self.compliance.insert(user, UserCompliance { hash, is_compliant });
        Ok(())
    }

    /// Admin: seed many accounts at once.
    ///
    /// Lengths are validated before any entry is written, so a mismatch
    /// leaves the table untouched.
    pub fn batch_set_user_compliance(
        &mut self,
        ctx: TxContext,
        users: &[AccountId],
        hashes: &[Digest32],
        flags: &[bool],
    ) -> Result<(), VerifierError> {
        self.require_admin(ctx.caller)?;
        if users.len() != hashes.len() || users.len() != flags.len() {
            return Err(VerifierError::BatchLengthMismatch {
                users: users.len(),
                hashes: hashes.len(),
                flags: flags.len(),
            });
        }
        for ((user, hash), flag) in users.iter().zip(hashes).zip(flags) {
            self.compliance.insert(
                *user,
                UserCompliance {
                    hash: *hash,
                    is_compliant: *flag,
                },
            );
        }
        Ok(())
    }

    fn require_admin(&self, caller: AccountId) -> Result<(), VerifierError> {
        if caller != self.admin {
            return Err(VerifierError::Unauthorized(caller));
        }
        Ok(())
    }
}
