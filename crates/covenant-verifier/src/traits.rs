//! # Proving System Trait
//!
//! Abstract interface for the zero-knowledge proving system that attests
//! compliance facts. All implementations (mock, Groth16, PLONK) must
//! satisfy this trait; the gate and verifier are generic over it, so the
//! mock and a real system are interchangeable at compile time.
//!
//! ## Security Invariant
//!
//! `Send + Sync` bounds allow safe concurrent access. Proof generation
//! and verification are pure functions with no side effects — replay and
//! expiration bookkeeping live in the callers, never here.

use thiserror::Error;

/// Error during proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The circuit is malformed or unsatisfiable.
    #[error("circuit error: {0}")]
    CircuitError(String),
    /// Witness generation failed.
    #[error("witness error: {0}")]
    WitnessError(String),
    /// Internal prover error.
    #[error("prover error: {0}")]
    ProverError(String),
}

/// Error during proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof artifact could not be parsed.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// The verifying key is incompatible.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),
}

/// Abstract interface for a zero-knowledge proving system.
///
/// Each implementation provides its own proof and key types. `verify`
/// returning `Ok(false)` means the proof parsed but does not hold;
/// `Err(_)` means the artifact or key is unusable.
pub trait ProvingSystem: Send + Sync {
    /// The proof type produced by this system.
    type Proof: Send + Sync;
    /// The verifying key type.
    type VerifyingKey: Clone + Send + Sync;
    /// The proving key type.
    type ProvingKey: Send + Sync;

    /// Generate a proof over the given inputs.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        public_inputs: &[u8],
        private_inputs: &[u8],
    ) -> Result<Self::Proof, ProofError>;

    /// Verify a proof against its public inputs.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[u8],
    ) -> Result<bool, VerifyError>;

    /// Parse a raw proof artifact as received from a caller.
    fn parse_proof(&self, artifact: &[u8]) -> Result<Self::Proof, VerifyError>;
}
