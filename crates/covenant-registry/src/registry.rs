//! # Attestation Registry
//!
//! Request/result bookkeeping for the multi-operator verification
//! network. Submission is permissionless; resolution is restricted to
//! registered operators — that split is the trust boundary preventing a
//! caller from self-attesting.
//!
//! ## Security Invariant
//!
//! Results are append-once. Concurrent `set_result` calls for the same
//! request let exactly one writer win; later calls fail with
//! `AlreadyResolved` regardless of operator identity or arguments.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use covenant_core::digest::DigestBuilder;
use covenant_core::{AccountId, Digest32, Timestamp, TxContext};

use crate::request::{RequestId, RequestStatus, VerificationRequest, VerificationResult};

/// Default pending window: one hour of block time.
pub const VERIFICATION_TIMEOUT_SECS: u64 = 60 * 60;

/// Errors raised by the attestation registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The request id is not in the registry.
    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    /// The request already has a result; results are append-once.
    #[error("request already resolved: {0}")]
    AlreadyResolved(RequestId),

    /// Caller lacks the required role.
    #[error("unauthorized: {0} lacks the required role")]
    Unauthorized(AccountId),

    /// The operator is already registered.
    #[error("duplicate operator: {0}")]
    DuplicateOperator(AccountId),
}

/// Events emitted at the registry's state-change points.
///
/// Kept in an append-only log so callers and tests can observe emissions;
/// also mirrored to `tracing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A verification request entered the registry.
    RequestSubmitted {
        /// The new request's identifier.
        request_id: RequestId,
        /// The account being verified.
        user: AccountId,
        /// Digest of the proof artifact under verification.
        proof_hash: Digest32,
        /// Submission block time.
        submitted_at: Timestamp,
    },
    /// An operator resolved a request.
    ResultAvailable {
        /// The resolved request.
        request_id: RequestId,
        /// The account that was verified.
        user: AccountId,
        /// The attested verdict.
        is_valid: bool,
        /// Content hash of the verified data, when valid.
        data_hash: Option<Digest32>,
        /// The operator that posted the result.
        operator: AccountId,
    },
}

/// The decentralized attestation registry.
#[derive(Debug)]
pub struct AttestationRegistry {
    requests: HashMap<RequestId, VerificationRequest>,
    results: HashMap<RequestId, VerificationResult>,
    latest: HashMap<AccountId, RequestId>,
    // Small by construction (tens of operators); membership is a linear scan.
    operators: Vec<AccountId>,
    admin: AccountId,
    timeout_secs: u64,
    // Monotonic per-registry ordinal folded into request ids so two
    // submissions in the same instant cannot collide.
    submission_ordinal: u64,
    events: Vec<RegistryEvent>,
}

impl AttestationRegistry {
    /// Create a registry with the default one-hour pending window.
    pub fn new(admin: AccountId) -> Self {
        Self::with_timeout(admin, VERIFICATION_TIMEOUT_SECS)
    }

    /// Create a registry with an explicit pending window.
    pub fn with_timeout(admin: AccountId, timeout_secs: u64) -> Self {
        Self {
            requests: HashMap::new(),
            results: HashMap::new(),
            latest: HashMap::new(),
            operators: Vec::new(),
            admin,
            timeout_secs,
            submission_ordinal: 0,
            events: Vec::new(),
        }
    }

    /// Submit a verification request. Permissionless.
    ///
    /// Stores the request as pending, records it as the user's latest,
    /// and emits [`RegistryEvent::RequestSubmitted`]. Verification is
    /// performed out-of-band by registered operators, who later call
    /// [`AttestationRegistry::set_result()`].
    pub fn submit_request(
        &mut self,
        ctx: TxContext,
        user: AccountId,
        proof_hash: Digest32,
        compliance_data: Vec<u8>,
    ) -> RequestId {
        self.submission_ordinal += 1;
        let id = RequestId(
            DigestBuilder::new()
                .field(user.as_bytes())
                .field(proof_hash.as_bytes())
                .field(&ctx.now.epoch_secs().to_be_bytes())
                .field(&self.submission_ordinal.to_be_bytes())
                .field(ctx.caller.as_bytes())
                .finish(),
        );
        self.requests.insert(
            id,
            VerificationRequest {
                id,
                user,
                proof_hash,
                compliance_data,
                submitted_at: ctx.now,
            },
        );
        self.latest.insert(user, id);
        self.push_event(RegistryEvent::RequestSubmitted {
            request_id: id,
            user,
            proof_hash,
            submitted_at: ctx.now,
        });
        id
    }

    /// Whether a request is still awaiting resolution.
    ///
    /// `false` for unknown ids, resolved requests, and requests at or
    /// past `submitted_at + timeout` — so "pending" is never true
    /// forever, and callers have a hard upper bound on how long to wait.
    pub fn is_pending(&self, id: RequestId, now: Timestamp) -> bool {
        self.status(id, now) == RequestStatus::Pending
    }

    /// Derived read-time status of a request.
    pub fn status(&self, id: RequestId, now: Timestamp) -> RequestStatus {
        let Some(request) = self.requests.get(&id) else {
            return RequestStatus::Unknown;
        };
        if self.results.contains_key(&id) {
            return RequestStatus::Resolved;
        }
        // Exclusive boundary: pending through timeout - 1, timed out
        // from submitted_at + timeout onward.
        if now.secs_since(request.submitted_at) < self.timeout_secs {
            RequestStatus::Pending
        } else {
            RequestStatus::TimedOut
        }
    }

    /// Operator-only: post the result for a pending request.
    ///
    /// First writer wins; a second call for the same request fails with
    /// [`RegistryError::AlreadyResolved`].
    pub fn set_result(
        &mut self,
        ctx: TxContext,
        id: RequestId,
        is_valid: bool,
        data_hash: Option<Digest32>,
        reason: Option<String>,
    ) -> Result<(), RegistryError> {
        if !self.is_operator(ctx.caller) {
            return Err(RegistryError::Unauthorized(ctx.caller));
        }
        let Some(request) = self.requests.get(&id) else {
            return Err(RegistryError::RequestNotFound(id));
        };
        let user = request.user;
        match self.results.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyResolved(id)),
            Entry::Vacant(slot) => {
                slot.insert(VerificationResult {
                    request_id: id,
                    is_valid,
                    data_hash,
                    reason,
                    resolved_at: ctx.now,
                    operator: ctx.caller,
                });
                self.push_event(RegistryEvent::ResultAvailable {
                    request_id: id,
                    user,
                    is_valid,
                    data_hash,
                    operator: ctx.caller,
                });
                Ok(())
            }
        }
    }

    /// The result for a request, if one has been posted.
    pub fn result(&self, id: RequestId) -> Option<&VerificationResult> {
        self.results.get(&id)
    }

    /// The stored request record, if the id is known.
    pub fn request(&self, id: RequestId) -> Option<&VerificationRequest> {
        self.requests.get(&id)
    }

    /// The result of the user's most recent request, if any exists and
    /// has been resolved. `None` when the user has no history or the
    /// latest request is still unresolved.
    pub fn latest_verification(&self, user: AccountId) -> Option<&VerificationResult> {
        self.latest.get(&user).and_then(|id| self.results.get(id))
    }

    /// The user's most recent request id, if any.
    pub fn latest_request(&self, user: AccountId) -> Option<RequestId> {
        self.latest.get(&user).copied()
    }

    /// Admin-only: register an attestation operator. Rejects duplicates.
    pub fn add_operator(&mut self, ctx: TxContext, operator: AccountId) -> Result<(), RegistryError> {
        if ctx.caller != self.admin {
            return Err(RegistryError::Unauthorized(ctx.caller));
        }
        if self.is_operator(operator) {
            return Err(RegistryError::DuplicateOperator(operator));
        }
        self.operators.push(operator);
        Ok(())
    }

    /// Whether an account is a registered operator.
    pub fn is_operator(&self, account: AccountId) -> bool {
        self.operators.contains(&account)
    }

    /// The registry's append-only event log.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    fn push_event(&mut self, event: RegistryEvent) {
        match &event {
            RegistryEvent::RequestSubmitted { request_id, user, .. } => {
                tracing::info!(
                    target: "covenant::registry",
                    request_id = %request_id,
                    user = %user,
                    "verification request submitted"
                );
            }
            RegistryEvent::ResultAvailable { request_id, is_valid, operator, .. } => {
                tracing::info!(
                    target: "covenant::registry",
                    request_id = %request_id,
                    is_valid,
                    operator = %operator,
                    "verification result available"
                );
            }
        }
        self.events.push(event);
    }
}
