//! # Compliance Records
//!
//! The per-account state the gate consults on the fast path. Records are
//! owned exclusively by the gate: the store's mutating methods are
//! crate-private, so verification backends cannot write records —
//! single-writer discipline by construction.
//!
//! Expiration is computed at read time: a record flips to non-compliant
//! the instant block time passes `last_proof_timestamp + window`, with
//! no mutation and no background process.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use covenant_core::{AccountId, Digest32, Timestamp};

/// One account's verified compliance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// Whether the last accepted verification asserted compliance.
    pub is_compliant: bool,
    /// Content hash of the verified compliance data.
    pub compliance_hash: Digest32,
    /// When the accepted proof was verified (block time).
    pub last_proof_timestamp: Timestamp,
}

/// The read model returned by compliance checks.
///
/// `is_compliant` already folds in expiration; the hash and timestamp
/// are reported even for an expired record so callers can distinguish
/// "never verified" from "verification lapsed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceStatus {
    /// Stored flag AND not expired, at the query's block time.
    pub is_compliant: bool,
    /// Content hash from the last accepted verification, if any.
    pub compliance_hash: Option<Digest32>,
    /// Timestamp of the last accepted verification, if any.
    pub last_proof_timestamp: Option<Timestamp>,
}

impl ComplianceStatus {
    /// Status for an account with no record.
    pub fn absent() -> Self {
        Self {
            is_compliant: false,
            compliance_hash: None,
            last_proof_timestamp: None,
        }
    }
}

/// Per-account record storage, keyed by ledger address.
///
/// Two different users' records never contend; mutation is crate-private
/// so only the gate's acceptance path writes.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<AccountId, ComplianceRecord>,
}

impl RecordStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an account's record, if one exists.
    pub fn get(&self, user: AccountId) -> Option<&ComplianceRecord> {
        self.records.get(&user)
    }

    /// Compute an account's status at the given block time.
    pub fn status(&self, user: AccountId, now: Timestamp, expiration_secs: u64) -> ComplianceStatus {
        match self.records.get(&user) {
            None => ComplianceStatus::absent(),
            Some(record) => ComplianceStatus {
                is_compliant: record.is_compliant
                    && now.within_window(record.last_proof_timestamp, expiration_secs),
                compliance_hash: Some(record.compliance_hash),
                last_proof_timestamp: Some(record.last_proof_timestamp),
            },
        }
    }

    /// Write an account's record. Gate-only.
    pub(crate) fn put(&mut self, user: AccountId, record: ComplianceRecord) {
        self.records.insert(user, record);
    }
}
