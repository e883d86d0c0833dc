//! # Transaction Context
//!
//! The slice of ledger environment every state-mutating operation needs:
//! who is calling, and what the block time is. The host ledger totally
//! orders operations and supplies both values; components never read an
//! ambient clock or guess at caller identity.

use serde::{Deserialize, Serialize};

use crate::identity::AccountId;
use crate::temporal::Timestamp;

/// Per-operation ledger environment: calling account and block time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TxContext {
    /// The account that signed the triggering transaction.
    pub caller: AccountId,
    /// Block time of the transaction, as supplied by the host ledger.
    pub now: Timestamp,
}

impl TxContext {
    /// Construct a context for the given caller and block time.
    pub fn new(caller: AccountId, now: Timestamp) -> Self {
        Self { caller, now }
    }
}
