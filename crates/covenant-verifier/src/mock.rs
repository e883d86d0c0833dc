//! # Mock Proving System (Phase 1)
//!
//! A deterministic, transparent "proving system": a proof is the SHA-256
//! of a domain tag and the public inputs.
//! It provides no zero-knowledge privacy but satisfies the trait
//! interface, so the gate's orchestration can be exercised end to end
//! before a real system is wired in.
//!
//! ## Security Notice
//!
//! This implementation provides NO zero-knowledge privacy and NO
//! soundness against a prover who knows the construction. Phase 1 only.

use covenant_core::digest::DigestBuilder;

use crate::traits::{ProofError, ProvingSystem, VerifyError};

const MOCK_DOMAIN_TAG: &[u8] = b"covenant:mock-proof:v1";

/// A mock proof — a deterministic 32-byte hash of the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProof {
    /// The mock proof bytes.
    pub bytes: [u8; 32],
}

/// A mock verifying key.
#[derive(Debug, Clone, Default)]
pub struct MockVerifyingKey;

/// A mock proving key.
#[derive(Debug, Clone, Default)]
pub struct MockProvingKey;

/// Phase 1 mock proving system — deterministic, transparent, no ZK privacy.
#[derive(Debug, Default)]
pub struct MockProvingSystem;

impl MockProvingSystem {
    fn digest(public_inputs: &[u8]) -> [u8; 32] {
        *DigestBuilder::new()
            .field(MOCK_DOMAIN_TAG)
            .field(public_inputs)
            .finish()
            .as_bytes()
    }
}

impl ProvingSystem for MockProvingSystem {
    type Proof = MockProof;
    type VerifyingKey = MockVerifyingKey;
    type ProvingKey = MockProvingKey;

    fn prove(
        &self,
        _pk: &Self::ProvingKey,
        public_inputs: &[u8],
        _private_inputs: &[u8],
    ) -> Result<Self::Proof, ProofError> {
        Ok(MockProof {
            bytes: Self::digest(public_inputs),
        })
    }

    fn verify(
        &self,
        _vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[u8],
    ) -> Result<bool, VerifyError> {
        Ok(proof.bytes == Self::digest(public_inputs))
    }

    fn parse_proof(&self, artifact: &[u8]) -> Result<Self::Proof, VerifyError> {
        let bytes: [u8; 32] = artifact
            .try_into()
            .map_err(|_| VerifyError::MalformedProof(format!(
                "mock proof must be 32 bytes, got {}",
                artifact.len()
            )))?;
        Ok(MockProof { bytes })
    }
}
