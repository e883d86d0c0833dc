//! # covenant-registry — Decentralized Attestation Registry
//!
//! The asynchronous verification backend of the Covenant stack. Anyone
//! may submit a verification request; only registered operators may
//! resolve one. Verification itself happens off-ledger — operators
//! examine the request and later post a result in a separate ledger
//! operation, so callers poll rather than wait.
//!
//! ## State Machine
//!
//! The authoritative state of a request is binary:
//!
//! - result absent and inside the timeout window — pending;
//! - result present — terminal (valid or invalid), append-once.
//!
//! Timeout is a **derived read**, not a stored transition: once block
//! time reaches `submitted_at + timeout`, every reader treats the
//! request as failed without any cancel call. Resubmission is a fresh
//! request with a fresh id.

pub mod registry;
pub mod request;

pub use registry::{AttestationRegistry, RegistryError, RegistryEvent, VERIFICATION_TIMEOUT_SECS};
pub use request::{RequestId, RequestStatus, VerificationRequest, VerificationResult};
