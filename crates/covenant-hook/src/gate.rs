//! # Compliance Gate
//!
//! The orchestrator owning the record store, the fingerprint replay
//! ledger, the requirement policy, and the enablement switch. All record
//! writes flow through the gate's acceptance paths; verification
//! backends are consulted, never trusted with the store.
//!
//! ## Security Invariant
//!
//! Acceptance and fingerprint consumption happen in the same `&mut self`
//! operation, so two submissions of the same proof — in either order —
//! result in exactly one acceptance and one `ProofAlreadyUsed`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use covenant_core::digest::DigestBuilder;
use covenant_core::{AccountId, Digest32, RequirementPolicy, Timestamp, TxContext};
use covenant_fhe::{verify_computation, EncryptionGateway, FheEngine, FheRequestId};
use covenant_registry::AttestationRegistry;
use covenant_verifier::{ProvingSystem, PROOF_EXPIRATION_SECS};

use crate::record::{ComplianceRecord, ComplianceStatus, RecordStore};
use crate::signals::PublicSignals;

const FINGERPRINT_DOMAIN_TAG: &[u8] = b"covenant:proof-fingerprint:v1";

/// Errors raised by the compliance gate.
///
/// Each condition is distinct so calling clients can branch on cause;
/// all abort the triggering operation with no partial state change, and
/// none are retried by the gate itself.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GateError {
    /// The proof's public outputs have the wrong shape.
    #[error("invalid public signals: {0}")]
    InvalidPublicSignals(String),

    /// Cryptographic verification of the proof artifact failed.
    #[error("invalid proof")]
    InvalidProof,

    /// The proof fingerprint was already consumed.
    #[error("proof already used: {0}")]
    ProofAlreadyUsed(Digest32),

    /// The verification being reconciled is outside the acceptance window.
    #[error("proof expired: verified {verified}, window {window_secs}s")]
    ProofExpired {
        /// When the verification happened.
        verified: Timestamp,
        /// The acceptance window that was exceeded.
        window_secs: u64,
    },

    /// The proof is sound but asserts non-compliance.
    #[error("user not compliant: {0}")]
    UserNotCompliant(AccountId),

    /// The computation was evaluated against a policy other than the
    /// gate's configured one.
    #[error("policy mismatch: computation did not use the gate's requirement policy")]
    PolicyMismatch,

    /// The gate has been disabled by the admin.
    #[error("compliance hook not enabled")]
    HookNotEnabled,

    /// Caller is not the gate admin.
    #[error("unauthorized: {0} is not the gate admin")]
    Unauthorized(AccountId),

    /// No verification result exists to reconcile for the account.
    #[error("no verification result for {0}")]
    NoVerificationResult(AccountId),
}

/// Events emitted at the gate's state-change points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateEvent {
    /// A directly submitted proof was accepted.
    ProofAccepted {
        /// The account now holding a compliance record.
        user: AccountId,
        /// The verified compliance hash.
        compliance_hash: Digest32,
        /// Acceptance block time.
        at: Timestamp,
    },
    /// A backend verification result was reconciled into the store.
    RecordReconciled {
        /// The account now holding a compliance record.
        user: AccountId,
        /// The verified compliance hash.
        compliance_hash: Digest32,
        /// Which backend produced the result.
        backend: &'static str,
        /// Reconciliation block time.
        at: Timestamp,
    },
    /// The admin toggled the gate.
    EnabledChanged {
        /// The new enablement state.
        enabled: bool,
    },
    /// The admin replaced the requirement policy.
    RequirementsUpdated,
    /// The admin changed the proof expiration window.
    ExpirationChanged {
        /// The new window in seconds.
        window_secs: u64,
    },
}

/// The compliance gate, generic over the proving system at the
/// verification seam so the mock and a real system are interchangeable.
#[derive(Debug)]
pub struct ComplianceGate<P: ProvingSystem> {
    system: P,
    verifying_key: P::VerifyingKey,
    store: RecordStore,
    used_fingerprints: HashSet<Digest32>,
    policy: RequirementPolicy,
    enabled: bool,
    admin: AccountId,
    proof_expiration_secs: u64,
    events: Vec<GateEvent>,
}

impl<P: ProvingSystem> ComplianceGate<P> {
    /// Create an enabled gate with the default policy and 30-day window.
    pub fn new(admin: AccountId, system: P, verifying_key: P::VerifyingKey) -> Self {
        Self {
            system,
            verifying_key,
            store: RecordStore::new(),
            used_fingerprints: HashSet::new(),
            policy: RequirementPolicy::default(),
            enabled: true,
            admin,
            proof_expiration_secs: PROOF_EXPIRATION_SECS,
            events: Vec::new(),
        }
    }

    /// Submit a compliance proof for the calling account.
    ///
    /// Checks run in a fixed order, each with its own named failure:
    /// enablement, signal shape, cryptographic verification, replay,
    /// compliance verdict. On success the record write and the
    /// fingerprint consumption land in this same atomic operation.
    pub fn submit_proof(
        &mut self,
        ctx: TxContext,
        proof_artifact: &[u8],
        public_signals: &[u8],
    ) -> Result<(), GateError> {
        if !self.enabled {
            return Err(GateError::HookNotEnabled);
        }
        let signals = PublicSignals::decode(public_signals)?;

        let proof = self
            .system
            .parse_proof(proof_artifact)
            .map_err(|_| GateError::InvalidProof)?;
        let sound = self
            .system
            .verify(&self.verifying_key, &proof, public_signals)
            .map_err(|_| GateError::InvalidProof)?;
        if !sound {
            return Err(GateError::InvalidProof);
        }

        let fingerprint = proof_fingerprint(proof_artifact, public_signals);
        if self.used_fingerprints.contains(&fingerprint) {
            return Err(GateError::ProofAlreadyUsed(fingerprint));
        }

        if !signals.is_valid {
            return Err(GateError::UserNotCompliant(ctx.caller));
        }

        self.accept(
            ctx.caller,
            signals.compliance_hash,
            ctx.now,
            fingerprint,
            None,
        );
        Ok(())
    }

    /// Read-only compliance check at the given block time.
    ///
    /// Expiration is folded in at read time; nothing is mutated.
    pub fn check_compliance(&self, user: AccountId, now: Timestamp) -> ComplianceStatus {
        self.store.status(user, now, self.proof_expiration_secs)
    }

    /// Pull the account's latest attestation-registry result into the
    /// record store.
    ///
    /// The gate pulls; the registry never writes records. The attested
    /// proof hash is the replay fingerprint, and the result's resolution
    /// time must be inside the acceptance window.
    pub fn reconcile_attestation(
        &mut self,
        ctx: TxContext,
        registry: &AttestationRegistry,
        user: AccountId,
    ) -> Result<(), GateError> {
        if !self.enabled {
            return Err(GateError::HookNotEnabled);
        }
        let result = registry
            .latest_verification(user)
            .ok_or(GateError::NoVerificationResult(user))?;
        if !result.is_valid {
            return Err(GateError::UserNotCompliant(user));
        }
        let data_hash = result.data_hash.ok_or(GateError::InvalidProof)?;
        if !ctx.now.within_window(result.resolved_at, self.proof_expiration_secs) {
            return Err(GateError::ProofExpired {
                verified: result.resolved_at,
                window_secs: self.proof_expiration_secs,
            });
        }
        let fingerprint = registry
            .request(result.request_id)
            .map(|r| r.proof_hash)
            .ok_or(GateError::NoVerificationResult(user))?;
        if self.used_fingerprints.contains(&fingerprint) {
            return Err(GateError::ProofAlreadyUsed(fingerprint));
        }
        self.accept(user, data_hash, result.resolved_at, fingerprint, Some("attestation"));
        Ok(())
    }

    /// Pull a completed encrypted-computation result into the record
    /// store, checking the correctness proof against the account's
    /// stored ciphertext bundle and the policy the computation claimed.
    ///
    /// Computation requests are permissionless and carry a
    /// caller-chosen policy, so the gate only accepts evaluations of
    /// its own configured policy — anything else is `PolicyMismatch`.
    /// The replay fingerprint is the request id, unique per submission,
    /// so a fresh computation over the same bundle can renew a lapsed
    /// record while one result still reconciles at most once.
    pub fn reconcile_encrypted<E: FheEngine>(
        &mut self,
        ctx: TxContext,
        gateway: &EncryptionGateway<E>,
        user: AccountId,
        request_id: FheRequestId,
    ) -> Result<(), GateError> {
        if !self.enabled {
            return Err(GateError::HookNotEnabled);
        }
        let request = gateway
            .computation_request(request_id)
            .ok_or(GateError::NoVerificationResult(user))?;
        if request.owner != user {
            return Err(GateError::NoVerificationResult(user));
        }
        if request.policy != self.policy {
            return Err(GateError::PolicyMismatch);
        }
        let result = gateway
            .computation_result(request_id)
            .ok_or(GateError::NoVerificationResult(user))?;
        let bundle = gateway
            .latest_encryption(user)
            .ok_or(GateError::NoVerificationResult(user))?;
        if !verify_computation(bundle, &request.policy, result) {
            return Err(GateError::InvalidProof);
        }
        if !result.is_valid {
            return Err(GateError::UserNotCompliant(user));
        }
        if !ctx.now.within_window(result.computed_at, self.proof_expiration_secs) {
            return Err(GateError::ProofExpired {
                verified: result.computed_at,
                window_secs: self.proof_expiration_secs,
            });
        }
        let fingerprint = result.request_id.0;
        if self.used_fingerprints.contains(&fingerprint) {
            return Err(GateError::ProofAlreadyUsed(fingerprint));
        }
        self.accept(user, result.result_hash, result.computed_at, fingerprint, Some("fhe"));
        Ok(())
    }

    /// Admin: toggle the gate. Takes effect for all subsequent calls.
    pub fn set_enabled(&mut self, ctx: TxContext, enabled: bool) -> Result<(), GateError> {
        self.require_admin(ctx.caller)?;
        self.enabled = enabled;
        self.push_event(GateEvent::EnabledChanged { enabled });
        Ok(())
    }

    /// Admin: replace the requirement policy wholesale.
    pub fn update_requirements(
        &mut self,
        ctx: TxContext,
        policy: RequirementPolicy,
    ) -> Result<(), GateError> {
        self.require_admin(ctx.caller)?;
        self.policy = policy;
        self.push_event(GateEvent::RequirementsUpdated);
        Ok(())
    }

    /// Admin: change the proof expiration window. Applies immediately to
    /// every subsequent read — existing records may flip expired.
    pub fn set_proof_expiration(&mut self, ctx: TxContext, window_secs: u64) -> Result<(), GateError> {
        self.require_admin(ctx.caller)?;
        self.proof_expiration_secs = window_secs;
        self.push_event(GateEvent::ExpirationChanged { window_secs });
        Ok(())
    }

    /// Whether the gate is currently enforcing.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The current requirement policy.
    pub fn policy(&self) -> &RequirementPolicy {
        &self.policy
    }

    /// The current proof expiration window in seconds.
    pub fn proof_expiration_secs(&self) -> u64 {
        self.proof_expiration_secs
    }

    /// Whether a proof fingerprint has been consumed by this gate.
    pub fn is_fingerprint_used(&self, fingerprint: Digest32) -> bool {
        self.used_fingerprints.contains(&fingerprint)
    }

    /// The gate's append-only event log.
    pub fn events(&self) -> &[GateEvent] {
        &self.events
    }

    /// The single acceptance path: record write and fingerprint
    /// consumption in one place.
    fn accept(
        &mut self,
        user: AccountId,
        compliance_hash: Digest32,
        verified_at: Timestamp,
        fingerprint: Digest32,
        backend: Option<&'static str>,
    ) {
        self.store.put(
            user,
            ComplianceRecord {
                is_compliant: true,
                compliance_hash,
                last_proof_timestamp: verified_at,
            },
        );
        self.used_fingerprints.insert(fingerprint);
        let event = match backend {
            None => GateEvent::ProofAccepted {
                user,
                compliance_hash,
                at: verified_at,
            },
            Some(backend) => GateEvent::RecordReconciled {
                user,
                compliance_hash,
                backend,
                at: verified_at,
            },
        };
        self.push_event(event);
    }

    fn require_admin(&self, caller: AccountId) -> Result<(), GateError> {
        if caller != self.admin {
            return Err(GateError::Unauthorized(caller));
        }
        Ok(())
    }

    fn push_event(&mut self, event: GateEvent) {
        match &event {
            GateEvent::ProofAccepted { user, compliance_hash, .. } => {
                tracing::info!(
                    target: "covenant::gate",
                    user = %user,
                    compliance_hash = %compliance_hash,
                    "compliance proof accepted"
                );
            }
            GateEvent::RecordReconciled { user, backend, .. } => {
                tracing::info!(
                    target: "covenant::gate",
                    user = %user,
                    backend,
                    "verification result reconciled"
                );
            }
            GateEvent::EnabledChanged { enabled } => {
                tracing::info!(target: "covenant::gate", enabled, "gate enablement changed");
            }
            GateEvent::RequirementsUpdated => {
                tracing::info!(target: "covenant::gate", "requirement policy updated");
            }
            GateEvent::ExpirationChanged { window_secs } => {
                tracing::info!(target: "covenant::gate", window_secs, "proof expiration changed");
            }
        }
        self.events.push(event);
    }
}

/// The fingerprint identifying one proof submission for replay purposes:
/// a digest over the artifact and its public signals under a fixed
/// domain tag.
pub fn proof_fingerprint(proof_artifact: &[u8], public_signals: &[u8]) -> Digest32 {
    DigestBuilder::new()
        .field(FINGERPRINT_DOMAIN_TAG)
        .field(proof_artifact)
        .field(public_signals)
        .finish()
}
