//! # Compliance Data Model and Policy Validator
//!
//! The structured compliance record a user proves facts about, and the
//! admin-configurable policy those facts are checked against. The raw
//! record is never persisted on the ledger — only its content hash is —
//! so the hash must be a pure, order-fixed function of every field.
//!
//! ## Security Invariant
//!
//! `content_hash()` encodes the four flags in declaration order, the age
//! as big-endian u64, and the country code as a SHA-256 sub-digest. The
//! sub-digest gives the variable-length field a fixed width, so no two
//! distinct records can produce the same byte stream across a field
//! boundary, and equal codes always contribute equal bytes regardless of
//! how the caller obtained the string.

use serde::{Deserialize, Serialize};

use crate::digest::{sha256, Digest32, DigestBuilder};

/// A user's compliance attributes.
///
/// Derived off-ledger by a KYC provider or by the user's own proving
/// pipeline; only [`ComplianceData::content_hash()`] ever reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceData {
    /// KYC process completed successfully.
    pub kyc_passed: bool,
    /// Age attribute was verified by the provider.
    pub age_verified: bool,
    /// User's location is in the allowed set.
    pub location_allowed: bool,
    /// User is not on a sanctions list.
    pub not_sanctioned: bool,
    /// Verified age in years.
    pub age: u64,
    /// ISO country code of the verified location.
    pub country_code: String,
}

impl ComplianceData {
    /// Deterministic content hash over all six fields.
    ///
    /// Two semantically equal records always hash identically; any field
    /// change produces a different digest.
    pub fn content_hash(&self) -> Digest32 {
        DigestBuilder::new()
            .field(&[self.kyc_passed as u8])
            .field(&[self.age_verified as u8])
            .field(&[self.location_allowed as u8])
            .field(&[self.not_sanctioned as u8])
            .field(&self.age.to_be_bytes())
            .field(sha256(self.country_code.as_bytes()).as_bytes())
            .finish()
    }
}

/// The admin-configurable requirement policy.
///
/// Each `require_*` flag switches one independent check on or off;
/// thresholds apply only when the corresponding check is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementPolicy {
    /// Require a completed KYC process.
    pub require_kyc: bool,
    /// Require a verified age of at least `min_age`.
    pub require_age: bool,
    /// Require the user's location to be allowed.
    pub require_location: bool,
    /// Require a clean sanctions screening.
    pub require_sanctions_check: bool,
    /// Minimum age in years, applied when `require_age` is set.
    pub min_age: u64,
    /// Allowed country code; `None` means no location restriction is
    /// configured even when `require_location` is set (the data's own
    /// `location_allowed` flag still applies).
    pub allowed_country: Option<String>,
}

impl RequirementPolicy {
    /// Check compliance data against this policy.
    ///
    /// Pure: no side effects, and the four checks are independent, so
    /// evaluation order is unobservable. Returns `true` iff every
    /// *required* check individually passes.
    pub fn validate(&self, data: &ComplianceData) -> bool {
        if self.require_kyc && !data.kyc_passed {
            return false;
        }
        if self.require_age && (!data.age_verified || data.age < self.min_age) {
            return false;
        }
        if self.require_location && !data.location_allowed {
            return false;
        }
        if self.require_sanctions_check && !data.not_sanctioned {
            return false;
        }
        true
    }
}

impl Default for RequirementPolicy {
    /// All four checks required, adult age threshold, no specific country.
    fn default() -> Self {
        Self {
            require_kyc: true,
            require_age: true,
            require_location: true,
            require_sanctions_check: true,
            min_age: 18,
            allowed_country: None,
        }
    }
}
