//! # covenant-fhe — Encrypted-Computation Gateway
//!
//! The privacy-preserving verification backend of the Covenant stack.
//! A user's compliance attributes are encrypted field by field; the
//! gateway tracks asynchronous computation requests whose results carry
//! a correctness proof, so the ledger can confirm that the off-system
//! encrypted evaluation was performed faithfully against the stated
//! policy **without learning the plaintext**.
//!
//! Two-phase protocol, mirroring the attestation registry with one extra
//! phase: encrypt → request computation → poll for the result. Results
//! are posted by a registered coprocessor and are append-once.
//!
//! The encryption engine itself is an external collaborator behind the
//! [`FheEngine`] trait; the mock implementation is Phase 1 only.

pub mod engine;
pub mod gateway;
#[cfg(feature = "mock")]
pub mod mock;

pub use engine::{Ciphertext, EncryptedComplianceData, EngineError, FheEngine};
pub use gateway::{
    correctness_digest, verify_computation, ComputationRequest, EncryptionGateway,
    FheComputationResult, FheRequestId, GatewayError, GatewayEvent,
};
#[cfg(feature = "mock")]
pub use mock::MockFheEngine;
