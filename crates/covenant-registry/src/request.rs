//! # Verification Request and Result Types
//!
//! The records the registry keeps per request, and the derived status
//! enum readers consume. Results are append-once: a `VerificationResult`
//! is never mutated after its first write.

use serde::{Deserialize, Serialize};

use covenant_core::{AccountId, Digest32, Timestamp};

/// Identifier of one verification request.
///
/// Derived from {user, proof hash, submission time, per-registry ordinal,
/// submitter}, so two submissions in the same instant still get distinct
/// ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Digest32);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req:{}", self.0.to_hex())
    }
}

/// A verification request awaiting (or past) operator resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The account whose compliance is being verified.
    pub user: AccountId,
    /// Digest of the proof artifact the request is about.
    pub proof_hash: Digest32,
    /// Opaque compliance data blob for the operators to examine.
    pub compliance_data: Vec<u8>,
    /// When the request was submitted (block time).
    pub submitted_at: Timestamp,
}

/// An operator-submitted verification result. Written exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The request this result resolves.
    pub request_id: RequestId,
    /// Whether the user's compliance was attested valid.
    pub is_valid: bool,
    /// Content hash of the verified compliance data, when valid.
    pub data_hash: Option<Digest32>,
    /// Failure reason; `None` iff the result is valid.
    pub reason: Option<String>,
    /// When the result was posted (block time).
    pub resolved_at: Timestamp,
    /// The operator that posted the result.
    pub operator: AccountId,
}

/// Derived, read-time status of a request. Never persisted — computed
/// from the request/result tables and the current block time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// No result yet, still inside the timeout window.
    Pending,
    /// A result exists (valid or invalid).
    Resolved,
    /// No result and the timeout window has passed; readers treat this
    /// as failed and eligible for resubmission.
    TimedOut,
    /// The request id is not in the registry.
    Unknown,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Resolved => "RESOLVED",
            Self::TimedOut => "TIMED_OUT",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}
