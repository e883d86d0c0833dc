//! # Mock FHE Engine (Phase 1)
//!
//! A deterministic, transparent "FHE engine": each field is XORed with a
//! keystream derived from a secret and a per-field tag, and `evaluate`
//! decrypts internally before running the plaintext policy validator.
//! It provides no homomorphic security but satisfies the trait
//! interface, so the gateway's request/result orchestration can be
//! exercised end to end before a real scheme is wired in.
//!
//! ## Security Notice
//!
//! This implementation provides NO encryption security — the "secret" is
//! held by the same process that evaluates. Phase 1 only.

use rand::RngCore;
use sha2::{Digest, Sha256};

use covenant_core::{sha256, AccountId, ComplianceData, Digest32, RequirementPolicy, Timestamp};

use crate::engine::{Ciphertext, EncryptedComplianceData, EngineError, FheEngine};
use crate::gateway::correctness_digest;

/// Phase 1 mock FHE engine — deterministic XOR keystream, no security.
#[derive(Debug)]
pub struct MockFheEngine {
    secret: [u8; 32],
    public_key: Vec<u8>,
}

impl MockFheEngine {
    /// Create an engine with fresh random key material.
    pub fn new() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_secret(secret)
    }

    /// Create an engine from a fixed secret. Deterministic; for tests.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let public_key = sha256(&secret).as_bytes().to_vec();
        Self { secret, public_key }
    }

    fn keystream(&self, tag: &[u8], len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        let mut block: u64 = 0;
        while out.len() < len {
            let mut hasher = Sha256::new();
            hasher.update(self.secret);
            hasher.update(tag);
            hasher.update(block.to_be_bytes());
            out.extend_from_slice(&hasher.finalize());
            block += 1;
        }
        out.truncate(len);
        out
    }

    fn xor_field(&self, tag: &[u8], bytes: &[u8]) -> Ciphertext {
        let stream = self.keystream(tag, bytes.len());
        Ciphertext(bytes.iter().zip(stream).map(|(b, k)| b ^ k).collect())
    }

    fn decrypt_bool(&self, tag: &[u8], ct: &Ciphertext) -> Result<bool, EngineError> {
        let plain = self.xor_field(tag, ct.as_bytes());
        match plain.as_bytes() {
            [0] => Ok(false),
            [1] => Ok(true),
            other => Err(EngineError::MalformedCiphertext(format!(
                "expected one flag byte, got {} bytes",
                other.len()
            ))),
        }
    }

    fn decrypt_u64(&self, tag: &[u8], ct: &Ciphertext) -> Result<u64, EngineError> {
        let plain = self.xor_field(tag, ct.as_bytes());
        let bytes: [u8; 8] = plain
            .as_bytes()
            .try_into()
            .map_err(|_| EngineError::MalformedCiphertext("expected 8 age bytes".to_string()))?;
        Ok(u64::from_be_bytes(bytes))
    }

    fn decrypt_string(&self, tag: &[u8], ct: &Ciphertext) -> Result<String, EngineError> {
        let plain = self.xor_field(tag, ct.as_bytes());
        String::from_utf8(plain.0)
            .map_err(|e| EngineError::MalformedCiphertext(format!("country code not UTF-8: {e}")))
    }
}

impl Default for MockFheEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FheEngine for MockFheEngine {
    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    fn encrypt(
        &self,
        data: &ComplianceData,
        owner: AccountId,
        now: Timestamp,
    ) -> EncryptedComplianceData {
        EncryptedComplianceData {
            kyc_passed: self.xor_field(b"kyc_passed", &[data.kyc_passed as u8]),
            age_verified: self.xor_field(b"age_verified", &[data.age_verified as u8]),
            location_allowed: self.xor_field(b"location_allowed", &[data.location_allowed as u8]),
            not_sanctioned: self.xor_field(b"not_sanctioned", &[data.not_sanctioned as u8]),
            age: self.xor_field(b"age", &data.age.to_be_bytes()),
            country_code: self.xor_field(b"country_code", data.country_code.as_bytes()),
            owner,
            encrypted_at: now,
        }
    }

    fn evaluate(
        &self,
        bundle: &EncryptedComplianceData,
        policy: &RequirementPolicy,
    ) -> Result<(bool, Digest32), EngineError> {
        let data = ComplianceData {
            kyc_passed: self.decrypt_bool(b"kyc_passed", &bundle.kyc_passed)?,
            age_verified: self.decrypt_bool(b"age_verified", &bundle.age_verified)?,
            location_allowed: self.decrypt_bool(b"location_allowed", &bundle.location_allowed)?,
            not_sanctioned: self.decrypt_bool(b"not_sanctioned", &bundle.not_sanctioned)?,
            age: self.decrypt_u64(b"age", &bundle.age)?,
            country_code: self.decrypt_string(b"country_code", &bundle.country_code)?,
        };
        let is_valid = policy.validate(&data);
        Ok((is_valid, correctness_digest(bundle, policy, is_valid)))
    }
}
