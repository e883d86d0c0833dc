//! # Encryption Gateway
//!
//! Request/result bookkeeping for privacy-preserving compliance
//! evaluation. Encryption and computation requests are permissionless;
//! results are posted by registered coprocessors and are append-once,
//! mirroring the attestation registry's trust boundary.
//!
//! The correctness proof attached to every result binds the ciphertext
//! bundle, the policy, and the verdict together, so any observer can
//! confirm the off-system evaluation via [`verify_computation()`]
//! without learning the plaintext.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use covenant_core::digest::DigestBuilder;
use covenant_core::{sha256, AccountId, ComplianceData, Digest32, RequirementPolicy, Timestamp, TxContext};

use crate::engine::{EncryptedComplianceData, FheEngine};

const CORRECTNESS_DOMAIN_TAG: &[u8] = b"covenant:fhe-correctness:v1";

/// Identifier of one gateway request (an encryption or a computation).
///
/// Derived from {owner, bundle digest, block time, per-gateway ordinal,
/// submitter}, so two requests in the same instant get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FheRequestId(pub Digest32);

impl std::fmt::Display for FheRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fhe:{}", self.0.to_hex())
    }
}

/// A coprocessor-posted computation result. Written exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FheComputationResult {
    /// The computation request this result resolves.
    pub request_id: FheRequestId,
    /// Whether the encrypted evaluation found the user compliant.
    pub is_valid: bool,
    /// Digest of the ciphertext bundle the evaluation ran over.
    pub result_hash: Digest32,
    /// Digest binding bundle, policy, and verdict; see
    /// [`verify_computation()`].
    pub correctness_proof: Digest32,
    /// When the result was posted (block time).
    pub computed_at: Timestamp,
}

/// Errors raised by the encryption gateway.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GatewayError {
    /// The request id is not in the gateway.
    #[error("computation request not found: {0}")]
    RequestNotFound(FheRequestId),

    /// The request already has a result; results are append-once.
    #[error("computation already resolved: {0}")]
    AlreadyResolved(FheRequestId),

    /// Caller lacks the required role.
    #[error("unauthorized: {0} lacks the required role")]
    Unauthorized(AccountId),

    /// The account has no stored ciphertext bundle to compute over.
    #[error("no encryption stored for {0}")]
    NoEncryption(AccountId),

    /// The coprocessor is already registered.
    #[error("duplicate coprocessor: {0}")]
    DuplicateCoprocessor(AccountId),
}

/// Events emitted at the gateway's state-change points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// A ciphertext bundle was stored for an account.
    DataEncrypted {
        /// Identifier of the encryption request.
        request_id: FheRequestId,
        /// The account the bundle belongs to.
        owner: AccountId,
    },
    /// An encrypted evaluation was requested.
    ComputationRequested {
        /// Identifier of the computation request.
        request_id: FheRequestId,
        /// The account whose bundle is being evaluated.
        owner: AccountId,
    },
    /// A coprocessor posted a computation result.
    ComputationCompleted {
        /// The resolved computation request.
        request_id: FheRequestId,
        /// The attested verdict.
        is_valid: bool,
        /// The coprocessor that posted the result.
        coprocessor: AccountId,
    },
}

/// A pending encrypted-evaluation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationRequest {
    /// Unique request identifier.
    pub id: FheRequestId,
    /// The account whose bundle is being evaluated.
    pub owner: AccountId,
    /// The policy the evaluation must apply.
    pub policy: RequirementPolicy,
    /// Digest of the bundle the request was made over.
    pub bundle_digest: Digest32,
    /// When the computation was requested (block time).
    pub requested_at: Timestamp,
}

/// The encrypted-computation gateway.
#[derive(Debug)]
pub struct EncryptionGateway<E: FheEngine> {
    engine: E,
    encryptions: HashMap<AccountId, EncryptedComplianceData>,
    latest_encryption: HashMap<AccountId, FheRequestId>,
    computations: HashMap<FheRequestId, ComputationRequest>,
    results: HashMap<FheRequestId, FheComputationResult>,
    // Small by construction; membership is a linear scan.
    coprocessors: Vec<AccountId>,
    admin: AccountId,
    request_ordinal: u64,
    events: Vec<GatewayEvent>,
}

impl<E: FheEngine> EncryptionGateway<E> {
    /// Create a gateway around an encryption engine.
    pub fn new(admin: AccountId, engine: E) -> Self {
        Self {
            engine,
            encryptions: HashMap::new(),
            latest_encryption: HashMap::new(),
            computations: HashMap::new(),
            results: HashMap::new(),
            coprocessors: Vec::new(),
            admin,
            request_ordinal: 0,
            events: Vec::new(),
        }
    }

    /// Encrypt a compliance record for the calling account and store the
    /// resulting bundle as the account's latest.
    pub fn encrypt_compliance_data(
        &mut self,
        ctx: TxContext,
        data: &ComplianceData,
    ) -> (EncryptedComplianceData, FheRequestId) {
        let bundle = self.engine.encrypt(data, ctx.caller, ctx.now);
        let id = self.next_request_id(ctx, bundle.bundle_digest());
        self.encryptions.insert(ctx.caller, bundle.clone());
        self.latest_encryption.insert(ctx.caller, id);
        self.push_event(GatewayEvent::DataEncrypted {
            request_id: id,
            owner: ctx.caller,
        });
        (bundle, id)
    }

    /// Request an encrypted evaluation of `owner`'s stored bundle against
    /// a policy. The evaluation itself happens off-system; a registered
    /// coprocessor later posts the result via
    /// [`EncryptionGateway::post_result()`].
    pub fn request_computation(
        &mut self,
        ctx: TxContext,
        owner: AccountId,
        policy: RequirementPolicy,
    ) -> Result<FheRequestId, GatewayError> {
        let bundle_digest = self
            .encryptions
            .get(&owner)
            .map(|b| b.bundle_digest())
            .ok_or(GatewayError::NoEncryption(owner))?;
        let id = self.next_request_id(ctx, bundle_digest);
        self.computations.insert(
            id,
            ComputationRequest {
                id,
                owner,
                policy,
                bundle_digest,
                requested_at: ctx.now,
            },
        );
        self.push_event(GatewayEvent::ComputationRequested {
            request_id: id,
            owner,
        });
        Ok(id)
    }

    /// Coprocessor-only: post the result of an encrypted evaluation.
    ///
    /// First writer wins; a second call for the same request fails with
    /// [`GatewayError::AlreadyResolved`].
    pub fn post_result(
        &mut self,
        ctx: TxContext,
        id: FheRequestId,
        is_valid: bool,
        correctness_proof: Digest32,
    ) -> Result<(), GatewayError> {
        if !self.is_coprocessor(ctx.caller) {
            return Err(GatewayError::Unauthorized(ctx.caller));
        }
        let Some(request) = self.computations.get(&id) else {
            return Err(GatewayError::RequestNotFound(id));
        };
        let result_hash = request.bundle_digest;
        match self.results.entry(id) {
            Entry::Occupied(_) => Err(GatewayError::AlreadyResolved(id)),
            Entry::Vacant(slot) => {
                slot.insert(FheComputationResult {
                    request_id: id,
                    is_valid,
                    result_hash,
                    correctness_proof,
                    computed_at: ctx.now,
                });
                self.push_event(GatewayEvent::ComputationCompleted {
                    request_id: id,
                    is_valid,
                    coprocessor: ctx.caller,
                });
                Ok(())
            }
        }
    }

    /// The result for a computation request; `None` while pending.
    pub fn computation_result(&self, id: FheRequestId) -> Option<&FheComputationResult> {
        self.results.get(&id)
    }

    /// The stored computation request, if the id is known.
    pub fn computation_request(&self, id: FheRequestId) -> Option<&ComputationRequest> {
        self.computations.get(&id)
    }

    /// The engine's public encryption key.
    pub fn public_key(&self) -> &[u8] {
        self.engine.public_key()
    }

    /// The account's most recent ciphertext bundle, if any.
    pub fn latest_encryption(&self, user: AccountId) -> Option<&EncryptedComplianceData> {
        self.encryptions.get(&user)
    }

    /// The id under which the account's latest bundle was stored.
    pub fn latest_encryption_id(&self, user: AccountId) -> Option<FheRequestId> {
        self.latest_encryption.get(&user).copied()
    }

    /// Admin-only: register a result-posting coprocessor.
    pub fn add_coprocessor(&mut self, ctx: TxContext, coprocessor: AccountId) -> Result<(), GatewayError> {
        if ctx.caller != self.admin {
            return Err(GatewayError::Unauthorized(ctx.caller));
        }
        if self.is_coprocessor(coprocessor) {
            return Err(GatewayError::DuplicateCoprocessor(coprocessor));
        }
        self.coprocessors.push(coprocessor);
        Ok(())
    }

    /// Whether an account is a registered coprocessor.
    pub fn is_coprocessor(&self, account: AccountId) -> bool {
        self.coprocessors.contains(&account)
    }

    /// Access the engine, e.g. for a coprocessor performing evaluations.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The gateway's append-only event log.
    pub fn events(&self) -> &[GatewayEvent] {
        &self.events
    }

    fn next_request_id(&mut self, ctx: TxContext, bundle_digest: Digest32) -> FheRequestId {
        self.request_ordinal += 1;
        FheRequestId(
            DigestBuilder::new()
                .field(ctx.caller.as_bytes())
                .field(bundle_digest.as_bytes())
                .field(&ctx.now.epoch_secs().to_be_bytes())
                .field(&self.request_ordinal.to_be_bytes())
                .finish(),
        )
    }

    fn push_event(&mut self, event: GatewayEvent) {
        match &event {
            GatewayEvent::DataEncrypted { request_id, owner } => {
                tracing::info!(
                    target: "covenant::fhe",
                    request_id = %request_id,
                    owner = %owner,
                    "compliance data encrypted"
                );
            }
            GatewayEvent::ComputationRequested { request_id, owner } => {
                tracing::info!(
                    target: "covenant::fhe",
                    request_id = %request_id,
                    owner = %owner,
                    "encrypted computation requested"
                );
            }
            GatewayEvent::ComputationCompleted { request_id, is_valid, coprocessor } => {
                tracing::info!(
                    target: "covenant::fhe",
                    request_id = %request_id,
                    is_valid,
                    coprocessor = %coprocessor,
                    "encrypted computation completed"
                );
            }
        }
        self.events.push(event);
    }
}

/// Fixed-width encoding of a policy for digest purposes: the four flags
/// in declaration order, the minimum age big-endian, and the allowed
/// country as a tagged sub-digest.
fn policy_digest(policy: &RequirementPolicy) -> Digest32 {
    let country = match &policy.allowed_country {
        None => sha256(&[0u8]),
        Some(code) => DigestBuilder::new()
            .field(&[1u8])
            .field(sha256(code.as_bytes()).as_bytes())
            .finish(),
    };
    DigestBuilder::new()
        .field(&[policy.require_kyc as u8])
        .field(&[policy.require_age as u8])
        .field(&[policy.require_location as u8])
        .field(&[policy.require_sanctions_check as u8])
        .field(&policy.min_age.to_be_bytes())
        .field(country.as_bytes())
        .finish()
}

/// The correctness digest binding a ciphertext bundle, a policy, and a
/// verdict. An engine emits this alongside its verdict; observers
/// recompute it to confirm the evaluation was performed faithfully.
pub fn correctness_digest(
    bundle: &EncryptedComplianceData,
    policy: &RequirementPolicy,
    is_valid: bool,
) -> Digest32 {
    DigestBuilder::new()
        .field(CORRECTNESS_DOMAIN_TAG)
        .field(bundle.bundle_digest().as_bytes())
        .field(policy_digest(policy).as_bytes())
        .field(&[is_valid as u8])
        .finish()
}

/// Confirm a posted result against the bundle and policy it claims to
/// have evaluated: the result hash must match the bundle and the
/// correctness proof must recompute.
pub fn verify_computation(
    bundle: &EncryptedComplianceData,
    policy: &RequirementPolicy,
    result: &FheComputationResult,
) -> bool {
    result.result_hash == bundle.bundle_digest()
        && result.correctness_proof == correctness_digest(bundle, policy, result.is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFheEngine;

    fn admin() -> AccountId {
        AccountId::from_bytes([0xAA; 20])
    }

    fn coprocessor() -> AccountId {
        AccountId::from_bytes([0x0C; 20])
    }

    fn user() -> AccountId {
        AccountId::from_bytes([0x01; 20])
    }

    fn t(iso: &str) -> Timestamp {
        Timestamp::parse(iso).unwrap()
    }

    fn ctx(caller: AccountId, iso: &str) -> TxContext {
        TxContext::new(caller, t(iso))
    }

    fn data() -> ComplianceData {
        ComplianceData {
            kyc_passed: true,
            age_verified: true,
            location_allowed: true,
            not_sanctioned: true,
            age: 30,
            country_code: "CH".to_string(),
        }
    }

    fn gateway() -> EncryptionGateway<MockFheEngine> {
        let mut g = EncryptionGateway::new(admin(), MockFheEngine::from_secret([7; 32]));
        g.add_coprocessor(ctx(admin(), "2026-01-01T00:00:00Z"), coprocessor()).unwrap();
        g
    }

    #[test]
    fn test_encrypt_stores_latest_bundle() {
        let mut g = gateway();
        let (bundle, id) = g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &data());
        assert_eq!(g.latest_encryption(user()), Some(&bundle));
        assert_eq!(g.latest_encryption_id(user()), Some(id));
    }

    #[test]
    fn test_request_computation_requires_encryption() {
        let mut g = gateway();
        let err = g
            .request_computation(ctx(user(), "2026-01-01T12:00:00Z"), user(), RequirementPolicy::default())
            .unwrap_err();
        assert_eq!(err, GatewayError::NoEncryption(user()));
    }

    #[test]
    fn test_full_two_phase_flow() {
        let mut g = gateway();
        let policy = RequirementPolicy::default();
        let (bundle, _) = g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &data());
        let comp_id = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), policy.clone())
            .unwrap();

        // Pending: no result yet.
        assert!(g.computation_result(comp_id).is_none());

        // A coprocessor evaluates off-system and posts the result.
        let (is_valid, proof) = g.engine().evaluate(&bundle, &policy).unwrap();
        g.post_result(ctx(coprocessor(), "2026-01-01T12:10:00Z"), comp_id, is_valid, proof)
            .unwrap();

        let result = g.computation_result(comp_id).unwrap();
        assert!(result.is_valid);
        assert!(verify_computation(&bundle, &policy, result));
    }

    #[test]
    fn test_post_result_requires_coprocessor_role() {
        let mut g = gateway();
        g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &data());
        let id = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), RequirementPolicy::default())
            .unwrap();
        let err = g
            .post_result(ctx(user(), "2026-01-01T12:10:00Z"), id, true, sha256(b"forged"))
            .unwrap_err();
        assert_eq!(err, GatewayError::Unauthorized(user()));
    }

    #[test]
    fn test_results_append_once() {
        let mut g = gateway();
        let policy = RequirementPolicy::default();
        let (bundle, _) = g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &data());
        let id = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), policy.clone())
            .unwrap();
        let (is_valid, proof) = g.engine().evaluate(&bundle, &policy).unwrap();
        g.post_result(ctx(coprocessor(), "2026-01-01T12:10:00Z"), id, is_valid, proof)
            .unwrap();
        let err = g
            .post_result(ctx(coprocessor(), "2026-01-01T12:11:00Z"), id, false, sha256(b"other"))
            .unwrap_err();
        assert_eq!(err, GatewayError::AlreadyResolved(id));
    }

    #[test]
    fn test_unknown_request_rejected() {
        let mut g = gateway();
        let bogus = FheRequestId(sha256(b"nope"));
        let err = g
            .post_result(ctx(coprocessor(), "2026-01-01T12:10:00Z"), bogus, true, sha256(b"p"))
            .unwrap_err();
        assert_eq!(err, GatewayError::RequestNotFound(bogus));
    }

    #[test]
    fn test_tampered_result_fails_verification() {
        let mut g = gateway();
        let policy = RequirementPolicy::default();
        // Non-compliant data: underage.
        let minor = ComplianceData { age: 16, ..data() };
        let (bundle, _) = g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &minor);
        let id = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), policy.clone())
            .unwrap();

        // A dishonest coprocessor claims validity with the proof for the
        // honest (failing) verdict.
        let (is_valid, proof) = g.engine().evaluate(&bundle, &policy).unwrap();
        assert!(!is_valid);
        g.post_result(ctx(coprocessor(), "2026-01-01T12:10:00Z"), id, true, proof)
            .unwrap();
        assert!(!verify_computation(&bundle, &policy, g.computation_result(id).unwrap()));
    }

    #[test]
    fn test_request_ids_distinct_in_same_instant() {
        let mut g = gateway();
        g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &data());
        let a = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), RequirementPolicy::default())
            .unwrap();
        let b = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), RequirementPolicy::default())
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_events_record_lifecycle() {
        let mut g = gateway();
        let policy = RequirementPolicy::default();
        let (bundle, _) = g.encrypt_compliance_data(ctx(user(), "2026-01-01T12:00:00Z"), &data());
        let id = g
            .request_computation(ctx(user(), "2026-01-01T12:01:00Z"), user(), policy.clone())
            .unwrap();
        let (is_valid, proof) = g.engine().evaluate(&bundle, &policy).unwrap();
        g.post_result(ctx(coprocessor(), "2026-01-01T12:10:00Z"), id, is_valid, proof)
            .unwrap();

        assert_eq!(g.events().len(), 3);
        assert!(matches!(g.events()[0], GatewayEvent::DataEncrypted { .. }));
        assert!(matches!(g.events()[1], GatewayEvent::ComputationRequested { request_id, .. } if request_id == id));
        assert!(matches!(g.events()[2], GatewayEvent::ComputationCompleted { is_valid: true, .. }));
    }

    #[test]
    fn test_duplicate_coprocessor_rejected() {
        let mut g = gateway();
        let err = g
            .add_coprocessor(ctx(admin(), "2026-01-01T00:00:00Z"), coprocessor())
            .unwrap_err();
        assert_eq!(err, GatewayError::DuplicateCoprocessor(coprocessor()));
    }
}
