//! End-to-end scenarios across the gate and both asynchronous backends:
//! direct proof submission, replay, non-compliant verdicts, expiration,
//! attestation reconciliation, and encrypted-computation reconciliation.

use covenant_core::{sha256, AccountId, ComplianceData, RequirementPolicy, Timestamp, TxContext};
use covenant_fhe::{EncryptionGateway, FheEngine, MockFheEngine};
use covenant_hook::{ComplianceGate, ComplianceStatus, GateError, PublicSignals};
use covenant_registry::AttestationRegistry;
use covenant_verifier::{MockProvingKey, MockProvingSystem, MockVerifyingKey, ProvingSystem};

/// Route gate/registry/gateway events to the test output when RUST_LOG
/// is set. Safe to call from every test; only the first init wins.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn admin() -> AccountId {
    AccountId::from_bytes([0xAA; 20])
}

fn operator() -> AccountId {
    AccountId::from_bytes([0x0F; 20])
}

fn alice() -> AccountId {
    AccountId::from_bytes([0x01; 20])
}

fn t(iso: &str) -> Timestamp {
    Timestamp::parse(iso).unwrap()
}

fn ctx(caller: AccountId, iso: &str) -> TxContext {
    TxContext::new(caller, t(iso))
}

fn gate() -> ComplianceGate<MockProvingSystem> {
    ComplianceGate::new(admin(), MockProvingSystem, MockVerifyingKey)
}

/// A mock proof artifact plus encoded signals for the given verdict.
fn proof_for(hash: covenant_core::Digest32, is_valid: bool) -> (Vec<u8>, Vec<u8>) {
    let signals = PublicSignals {
        compliance_hash: hash,
        is_valid,
    }
    .encode();
    let proof = MockProvingSystem.prove(&MockProvingKey, &signals, b"witness").unwrap();
    (proof.bytes.to_vec(), signals)
}

fn compliant_data() -> ComplianceData {
    ComplianceData {
        kyc_passed: true,
        age_verified: true,
        location_allowed: true,
        not_sanctioned: true,
        age: 30,
        country_code: "CH".to_string(),
    }
}

// ── Scenario A: valid proof ⇒ compliant record ────────────────────────

#[test]
fn valid_proof_yields_compliant_status() {
    init_tracing();
    let mut g = gate();
    let hash = sha256(b"x");
    let (artifact, signals) = proof_for(hash, true);

    g.submit_proof(ctx(alice(), "2026-03-01T10:00:00Z"), &artifact, &signals)
        .unwrap();

    let status = g.check_compliance(alice(), t("2026-03-01T10:00:00Z"));
    assert_eq!(
        status,
        ComplianceStatus {
            is_compliant: true,
            compliance_hash: Some(hash),
            last_proof_timestamp: Some(t("2026-03-01T10:00:00Z")),
        }
    );
}

// ── Scenario B: identical resubmission ⇒ ProofAlreadyUsed ────────────

#[test]
fn resubmitted_proof_rejected_status_unchanged() {
    init_tracing();
    let mut g = gate();
    let hash = sha256(b"x");
    let (artifact, signals) = proof_for(hash, true);

    g.submit_proof(ctx(alice(), "2026-03-01T10:00:00Z"), &artifact, &signals)
        .unwrap();
    let before = g.check_compliance(alice(), t("2026-03-02T10:00:00Z"));

    let err = g
        .submit_proof(ctx(alice(), "2026-03-02T10:00:00Z"), &artifact, &signals)
        .unwrap_err();
    assert!(matches!(err, GateError::ProofAlreadyUsed(_)));
    assert_eq!(g.check_compliance(alice(), t("2026-03-02T10:00:00Z")), before);
}

// ── Scenario C: non-compliant verdict ⇒ no record ─────────────────────

#[test]
fn non_compliant_proof_writes_no_record() {
    init_tracing();
    let mut g = gate();
    let (artifact, signals) = proof_for(sha256(b"x"), false);

    let err = g
        .submit_proof(ctx(alice(), "2026-03-01T10:00:00Z"), &artifact, &signals)
        .unwrap_err();
    assert_eq!(err, GateError::UserNotCompliant(alice()));
    assert_eq!(
        g.check_compliance(alice(), t("2026-03-01T10:00:00Z")),
        ComplianceStatus::absent()
    );
}

// ── Scenario D: acceptance at t0, query past the window ───────────────

#[test]
fn compliance_lapses_after_window() {
    init_tracing();
    let mut g = gate();
    let (artifact, signals) = proof_for(sha256(b"x"), true);
    g.submit_proof(ctx(alice(), "2026-03-01T00:00:00Z"), &artifact, &signals)
        .unwrap();

    // Inside the 30-day window.
    assert!(g.check_compliance(alice(), t("2026-03-31T00:00:00Z")).is_compliant);
    // One second past it.
    assert!(!g.check_compliance(alice(), t("2026-03-31T00:00:01Z")).is_compliant);
}

// ── Attestation backend: submit, resolve, poll, reconcile ────────────

#[test]
fn attestation_flow_reconciles_into_record() {
    init_tracing();
    let mut g = gate();
    let mut registry = AttestationRegistry::new(admin());
    registry
        .add_operator(ctx(admin(), "2026-03-01T00:00:00Z"), operator())
        .unwrap();

    let data = compliant_data();
    let proof_hash = sha256(b"attested-artifact");
    let id = registry.submit_request(
        ctx(alice(), "2026-03-01T10:00:00Z"),
        alice(),
        proof_hash,
        b"opaque".to_vec(),
    );

    // While pending, the gate has nothing to reconcile.
    assert!(registry.is_pending(id, t("2026-03-01T10:05:00Z")));
    let err = g
        .reconcile_attestation(ctx(alice(), "2026-03-01T10:05:00Z"), &registry, alice())
        .unwrap_err();
    assert_eq!(err, GateError::NoVerificationResult(alice()));

    // An operator resolves out-of-band; the caller polls and reconciles.
    registry
        .set_result(
            ctx(operator(), "2026-03-01T10:30:00Z"),
            id,
            true,
            Some(data.content_hash()),
            None,
        )
        .unwrap();
    assert!(!registry.is_pending(id, t("2026-03-01T10:31:00Z")));

    g.reconcile_attestation(ctx(alice(), "2026-03-01T10:31:00Z"), &registry, alice())
        .unwrap();
    let status = g.check_compliance(alice(), t("2026-03-01T10:31:00Z"));
    assert!(status.is_compliant);
    assert_eq!(status.compliance_hash, Some(data.content_hash()));

    // Reconciling the same result again replays the same proof hash.
    let err = g
        .reconcile_attestation(ctx(alice(), "2026-03-01T10:32:00Z"), &registry, alice())
        .unwrap_err();
    assert!(matches!(err, GateError::ProofAlreadyUsed(_)));
}

#[test]
fn negative_attestation_never_reconciles() {
    init_tracing();
    let mut g = gate();
    let mut registry = AttestationRegistry::new(admin());
    registry
        .add_operator(ctx(admin(), "2026-03-01T00:00:00Z"), operator())
        .unwrap();

    let id = registry.submit_request(
        ctx(alice(), "2026-03-01T10:00:00Z"),
        alice(),
        sha256(b"artifact"),
        b"opaque".to_vec(),
    );
    registry
        .set_result(
            ctx(operator(), "2026-03-01T10:30:00Z"),
            id,
            false,
            None,
            Some("sanctions hit".to_string()),
        )
        .unwrap();

    let err = g
        .reconcile_attestation(ctx(alice(), "2026-03-01T10:31:00Z"), &registry, alice())
        .unwrap_err();
    assert_eq!(err, GateError::UserNotCompliant(alice()));
    assert!(!g.check_compliance(alice(), t("2026-03-01T10:31:00Z")).is_compliant);
}

#[test]
fn timed_out_request_resubmitted_with_fresh_id() {
    init_tracing();
    let mut registry = AttestationRegistry::new(admin());
    let first = registry.submit_request(
        ctx(alice(), "2026-03-01T10:00:00Z"),
        alice(),
        sha256(b"artifact"),
        b"opaque".to_vec(),
    );

    // Unresolved at the timeout boundary: treated as failed by every reader.
    assert!(!registry.is_pending(first, t("2026-03-01T11:00:00Z")));

    // Resubmission is a fresh request with a fresh id.
    let second = registry.submit_request(
        ctx(alice(), "2026-03-01T11:05:00Z"),
        alice(),
        sha256(b"artifact"),
        b"opaque".to_vec(),
    );
    assert_ne!(first, second);
    assert!(registry.is_pending(second, t("2026-03-01T11:06:00Z")));
}

// ── Encrypted backend: encrypt, compute, post, reconcile ─────────────

#[test]
fn encrypted_flow_reconciles_into_record() {
    init_tracing();
    let coprocessor = AccountId::from_bytes([0x0C; 20]);
    let mut g = gate();
    let mut gateway = EncryptionGateway::new(admin(), MockFheEngine::from_secret([7; 32]));
    gateway
        .add_coprocessor(ctx(admin(), "2026-03-01T00:00:00Z"), coprocessor)
        .unwrap();

    let policy = RequirementPolicy::default();
    let (bundle, _) =
        gateway.encrypt_compliance_data(ctx(alice(), "2026-03-01T10:00:00Z"), &compliant_data());
    let comp_id = gateway
        .request_computation(ctx(alice(), "2026-03-01T10:01:00Z"), alice(), policy.clone())
        .unwrap();

    // Pending: nothing to reconcile yet.
    let err = g
        .reconcile_encrypted(ctx(alice(), "2026-03-01T10:02:00Z"), &gateway, alice(), comp_id)
        .unwrap_err();
    assert_eq!(err, GateError::NoVerificationResult(alice()));

    // The coprocessor evaluates off-system and posts the result.
    let (is_valid, proof) = gateway.engine().evaluate(&bundle, &policy).unwrap();
    assert!(is_valid);
    gateway
        .post_result(ctx(coprocessor, "2026-03-01T10:10:00Z"), comp_id, is_valid, proof)
        .unwrap();

    g.reconcile_encrypted(ctx(alice(), "2026-03-01T10:11:00Z"), &gateway, alice(), comp_id)
        .unwrap();
    assert!(g.check_compliance(alice(), t("2026-03-01T10:11:00Z")).is_compliant);

    // One result reconciles at most once.
    let err = g
        .reconcile_encrypted(ctx(alice(), "2026-03-01T10:12:00Z"), &gateway, alice(), comp_id)
        .unwrap_err();
    assert!(matches!(err, GateError::ProofAlreadyUsed(_)));
}

#[test]
fn vacuous_policy_computation_never_reconciles() {
    init_tracing();
    let coprocessor = AccountId::from_bytes([0x0C; 20]);
    let mut g = gate();
    let mut gateway = EncryptionGateway::new(admin(), MockFheEngine::from_secret([7; 32]));
    gateway
        .add_coprocessor(ctx(admin(), "2026-03-01T00:00:00Z"), coprocessor)
        .unwrap();

    // Data failing every one of the gate's default requirements.
    let failing = ComplianceData {
        kyc_passed: false,
        age_verified: false,
        location_allowed: false,
        not_sanctioned: false,
        age: 12,
        country_code: "XX".to_string(),
    };
    assert!(!g.policy().validate(&failing));

    // A policy with nothing required honestly evaluates to valid.
    let vacuous = RequirementPolicy {
        require_kyc: false,
        require_age: false,
        require_location: false,
        require_sanctions_check: false,
        min_age: 0,
        allowed_country: None,
    };
    let (bundle, _) = gateway.encrypt_compliance_data(ctx(alice(), "2026-03-01T10:00:00Z"), &failing);
    let comp_id = gateway
        .request_computation(ctx(alice(), "2026-03-01T10:01:00Z"), alice(), vacuous.clone())
        .unwrap();
    let (is_valid, proof) = gateway.engine().evaluate(&bundle, &vacuous).unwrap();
    assert!(is_valid);
    gateway
        .post_result(ctx(coprocessor, "2026-03-01T10:10:00Z"), comp_id, is_valid, proof)
        .unwrap();

    // The gate only accepts evaluations of its own configured policy.
    let err = g
        .reconcile_encrypted(ctx(alice(), "2026-03-01T10:11:00Z"), &gateway, alice(), comp_id)
        .unwrap_err();
    assert_eq!(err, GateError::PolicyMismatch);
    assert!(!g.check_compliance(alice(), t("2026-03-01T10:11:00Z")).is_compliant);
}

#[test]
fn fresh_computation_renews_lapsed_record() {
    init_tracing();
    let coprocessor = AccountId::from_bytes([0x0C; 20]);
    let mut g = gate();
    let mut gateway = EncryptionGateway::new(admin(), MockFheEngine::from_secret([7; 32]));
    gateway
        .add_coprocessor(ctx(admin(), "2026-03-01T00:00:00Z"), coprocessor)
        .unwrap();

    let policy = RequirementPolicy::default();
    let (bundle, _) =
        gateway.encrypt_compliance_data(ctx(alice(), "2026-03-01T10:00:00Z"), &compliant_data());
    let first = gateway
        .request_computation(ctx(alice(), "2026-03-01T10:01:00Z"), alice(), policy.clone())
        .unwrap();
    let (is_valid, first_proof) = gateway.engine().evaluate(&bundle, &policy).unwrap();
    gateway
        .post_result(ctx(coprocessor, "2026-03-01T10:10:00Z"), first, is_valid, first_proof)
        .unwrap();
    g.reconcile_encrypted(ctx(alice(), "2026-03-01T10:11:00Z"), &gateway, alice(), first)
        .unwrap();

    // 31 days later the record has lapsed.
    assert!(!g.check_compliance(alice(), t("2026-04-01T10:11:00Z")).is_compliant);

    // A fresh computation over the same bundle and policy reproduces the
    // same correctness digest, yet still renews the record: replay is
    // keyed by the per-submission request id.
    let second = gateway
        .request_computation(ctx(alice(), "2026-04-01T11:00:00Z"), alice(), policy.clone())
        .unwrap();
    let (is_valid, second_proof) = gateway.engine().evaluate(&bundle, &policy).unwrap();
    assert_eq!(first_proof, second_proof);
    gateway
        .post_result(ctx(coprocessor, "2026-04-01T11:10:00Z"), second, is_valid, second_proof)
        .unwrap();
    g.reconcile_encrypted(ctx(alice(), "2026-04-01T11:11:00Z"), &gateway, alice(), second)
        .unwrap();
    assert!(g.check_compliance(alice(), t("2026-04-01T11:11:00Z")).is_compliant);
}

#[test]
fn forged_encrypted_result_rejected() {
    init_tracing();
    let coprocessor = AccountId::from_bytes([0x0C; 20]);
    let mut g = gate();
    let mut gateway = EncryptionGateway::new(admin(), MockFheEngine::from_secret([7; 32]));
    gateway
        .add_coprocessor(ctx(admin(), "2026-03-01T00:00:00Z"), coprocessor)
        .unwrap();

    // Underage data: the honest verdict is non-compliant.
    let minor = ComplianceData { age: 16, ..compliant_data() };
    let policy = RequirementPolicy::default();
    let (bundle, _) = gateway.encrypt_compliance_data(ctx(alice(), "2026-03-01T10:00:00Z"), &minor);
    let comp_id = gateway
        .request_computation(ctx(alice(), "2026-03-01T10:01:00Z"), alice(), policy.clone())
        .unwrap();

    // A dishonest coprocessor flips the verdict but cannot forge the
    // correctness proof; the gate refuses to reconcile.
    let (is_valid, honest_proof) = gateway.engine().evaluate(&bundle, &policy).unwrap();
    assert!(!is_valid);
    gateway
        .post_result(ctx(coprocessor, "2026-03-01T10:10:00Z"), comp_id, true, honest_proof)
        .unwrap();

    let err = g
        .reconcile_encrypted(ctx(alice(), "2026-03-01T10:11:00Z"), &gateway, alice(), comp_id)
        .unwrap_err();
    assert_eq!(err, GateError::InvalidProof);
    assert!(!g.check_compliance(alice(), t("2026-03-01T10:11:00Z")).is_compliant);
}

// ── Cross-user independence ───────────────────────────────────────────

#[test]
fn records_are_independent_per_account() {
    init_tracing();
    let bob = AccountId::from_bytes([0x02; 20]);
    let mut g = gate();

    let (artifact_a, signals_a) = proof_for(sha256(b"alice-data"), true);
    let (artifact_b, signals_b) = proof_for(sha256(b"bob-data"), true);

    g.submit_proof(ctx(alice(), "2026-03-01T10:00:00Z"), &artifact_a, &signals_a)
        .unwrap();
    g.submit_proof(ctx(bob, "2026-03-01T10:00:00Z"), &artifact_b, &signals_b)
        .unwrap();

    assert_eq!(
        g.check_compliance(alice(), t("2026-03-01T10:00:00Z")).compliance_hash,
        Some(sha256(b"alice-data"))
    );
    assert_eq!(
        g.check_compliance(bob, t("2026-03-01T10:00:00Z")).compliance_hash,
        Some(sha256(b"bob-data"))
    );
}
