//! # covenant-core — Foundational Types for the Covenant Stack
//!
//! This crate is the bedrock of the Covenant compliance-gate stack. It
//! defines the primitives every other crate in the workspace builds on;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Digest32`, `AccountId`,
//!    `Timestamp` — no bare byte arrays or integers for identifiers.
//!
//! 2. **No zero sentinels.** Absence of a digest, record, or result is
//!    `Option<_>`, never an all-zero value that readers must know to
//!    treat as "empty".
//!
//! 3. **Explicit ledger environment.** Operations that need the current
//!    time or the calling account receive a [`TxContext`] from the host;
//!    there is no ambient clock inside state-mutating code.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `covenant-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod compliance;
pub mod context;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use compliance::{ComplianceData, RequirementPolicy};
pub use context::TxContext;
pub use digest::{sha256, Digest32};
pub use error::CoreError;
pub use identity::AccountId;
pub use temporal::Timestamp;
