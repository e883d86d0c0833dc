//! # covenant-hook — The Compliance Gate
//!
//! The orchestrator of the Covenant stack. The gate sits behind the
//! AMM's hook dispatch mechanism and decides, before each protected
//! swap or liquidity operation, whether the caller may proceed:
//!
//! - fast path: a fresh, unexpired [`record::ComplianceRecord`] admits
//!   the caller in constant time;
//! - slow path: the caller supplies a proof through the hook data blob,
//!   verified inline via the [`covenant_verifier::ProvingSystem`] seam;
//! - asynchronous paths: results from the attestation registry or the
//!   encrypted-computation gateway are **pulled** into the record store
//!   by the gate's reconcile operations — backends never write records.
//!
//! The gate is the single point enforcing replay protection and
//! expiration uniformly across backends, and fails closed: disabled
//! gate, malformed signals, replayed fingerprints, and non-compliant
//! verdicts each abort with their own named error.

pub mod gate;
pub mod hooks;
pub mod record;
pub mod signals;

pub use gate::{ComplianceGate, GateError, GateEvent};
pub use hooks::{HookData, PoolHooks, PoolKey};
pub use record::{ComplianceRecord, ComplianceStatus, RecordStore};
pub use signals::PublicSignals;
