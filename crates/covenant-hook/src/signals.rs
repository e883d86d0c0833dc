//! # Public Signal Decoding
//!
//! The public outputs a compliance proof must carry: the compliance
//! hash and the validity flag, and nothing else. The wire shape is
//! exactly 33 bytes — a 32-byte digest followed by one flag byte that
//! must be 0 or 1. Anything else is a malformed-signals error, reported
//! immediately and never coerced.

use serde::{Deserialize, Serialize};

use covenant_core::Digest32;

use crate::gate::GateError;

/// Decoded public outputs of a compliance proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals {
    /// Content hash of the compliance data the proof attests to.
    pub compliance_hash: Digest32,
    /// Whether the proof asserts the data satisfies the policy.
    pub is_valid: bool,
}

impl PublicSignals {
    /// Wire size: 32-byte hash + 1 flag byte.
    pub const ENCODED_LEN: usize = 33;

    /// Decode from the wire shape, rejecting any deviation.
    pub fn decode(bytes: &[u8]) -> Result<Self, GateError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(GateError::InvalidPublicSignals(format!(
                "expected {} bytes, got {}",
                Self::ENCODED_LEN,
                bytes.len()
            )));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[..32]);
        let is_valid = match bytes[32] {
            0 => false,
            1 => true,
            other => {
                return Err(GateError::InvalidPublicSignals(format!(
                    "validity flag must be 0 or 1, got {other}"
                )))
            }
        };
        Ok(Self {
            compliance_hash: Digest32(hash),
            is_valid,
        })
    }

    /// Encode to the wire shape.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.extend_from_slice(self.compliance_hash.as_bytes());
        out.push(self.is_valid as u8);
        out
    }
}
