//! # FHE Engine Trait
//!
//! Abstract interface for the fully-homomorphic-encryption engine that
//! evaluates compliance policies over ciphertexts. All implementations
//! (mock, real FHE scheme) must satisfy this trait; the gateway is
//! generic over it.
//!
//! ## Security Invariant
//!
//! `evaluate` returns only a verdict bit and a correctness digest — the
//! plaintext attributes never cross this boundary back to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use covenant_core::{AccountId, ComplianceData, Digest32, RequirementPolicy, Timestamp};

/// An opaque ciphertext for one compliance field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(pub Vec<u8>);

impl Ciphertext {
    /// Access the raw ciphertext bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A compliance record with every scalar field replaced by a ciphertext.
///
/// Structurally mirrors [`ComplianceData`]; only the owner and the
/// encryption time are in the clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedComplianceData {
    /// Encrypted KYC flag.
    pub kyc_passed: Ciphertext,
    /// Encrypted age-verified flag.
    pub age_verified: Ciphertext,
    /// Encrypted location flag.
    pub location_allowed: Ciphertext,
    /// Encrypted sanctions flag.
    pub not_sanctioned: Ciphertext,
    /// Encrypted age.
    pub age: Ciphertext,
    /// Encrypted country code.
    pub country_code: Ciphertext,
    /// The account that owns this bundle.
    pub owner: AccountId,
    /// When the bundle was produced (block time).
    pub encrypted_at: Timestamp,
}

impl EncryptedComplianceData {
    /// Content digest over all six ciphertexts in declaration order.
    ///
    /// Used as the result hash and as input to the correctness proof.
    pub fn bundle_digest(&self) -> Digest32 {
        covenant_core::digest::DigestBuilder::new()
            .field(self.kyc_passed.as_bytes())
            .field(self.age_verified.as_bytes())
            .field(self.location_allowed.as_bytes())
            .field(self.not_sanctioned.as_bytes())
            .field(self.age.as_bytes())
            .field(self.country_code.as_bytes())
            .finish()
    }
}

/// Error raised by an FHE engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A ciphertext could not be processed.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),
    /// Internal evaluation failure.
    #[error("evaluation error: {0}")]
    EvaluationError(String),
}

/// Abstract interface for a fully-homomorphic-encryption engine.
pub trait FheEngine: Send + Sync {
    /// The engine's public encryption key.
    fn public_key(&self) -> &[u8];

    /// Encrypt a compliance record field by field on behalf of `owner`.
    fn encrypt(
        &self,
        data: &ComplianceData,
        owner: AccountId,
        now: Timestamp,
    ) -> EncryptedComplianceData;

    /// Evaluate a policy over a ciphertext bundle.
    ///
    /// Returns the verdict and a correctness digest binding the bundle,
    /// the policy, and the verdict together.
    fn evaluate(
        &self,
        bundle: &EncryptedComplianceData,
        policy: &RequirementPolicy,
    ) -> Result<(bool, Digest32), EngineError>;
}
