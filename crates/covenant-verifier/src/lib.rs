//! # covenant-verifier — Direct Proof Verification
//!
//! The synchronous verification backend of the Covenant stack. A user
//! presents a [`ComplianceProof`] bound to their account and an expected
//! compliance hash; the verifier checks expiration and the stored hash
//! and answers immediately, in the same ledger operation.
//!
//! Two entry points with deliberately different side-effect profiles:
//!
//! - [`ProofVerifier::verify_proof()`] — read-only, idempotent; replay
//!   bookkeeping is the caller's responsibility.
//! - [`ProofVerifier::verify_and_record()`] — the one-time path: same
//!   check, but consumes the proof hash in the same atomic operation.
//!
//! The cryptographic check of the proof artifact itself lives behind the
//! [`ProvingSystem`] trait; the mock implementation is Phase 1 only.

#[cfg(feature = "mock")]
pub mod mock;
pub mod proof;
pub mod traits;
pub mod verifier;

#[cfg(feature = "mock")]
pub use mock::{MockProof, MockProvingKey, MockProvingSystem, MockVerifyingKey};
pub use proof::{ComplianceProof, Verdict};
pub use traits::{ProofError, ProvingSystem, VerifyError};
pub use verifier::{ProofVerifier, UserCompliance, VerifierError, PROOF_EXPIRATION_SECS};
