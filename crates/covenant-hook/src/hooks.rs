//! # AMM Hook Callbacks
//!
//! The boundary the external AMM dispatcher calls around protected
//! operations. The dispatcher passes an opaque data blob through each
//! callback; callers needing verification embed a [`HookData`] payload
//! carrying their proof artifact and public signals.
//!
//! Before-callbacks gate the operation: a standing unexpired record
//! admits the caller in constant time, otherwise the embedded proof is
//! submitted inline. After-callbacks are allow-by-default — the gate has
//! nothing to enforce once the operation happened.

use serde::{Deserialize, Serialize};

use covenant_core::TxContext;
use covenant_verifier::ProvingSystem;

use crate::gate::{ComplianceGate, GateError};

/// Opaque identifier of an AMM pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey(pub [u8; 32]);

impl std::fmt::Display for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pool:{}", self.0.iter().map(|b| format!("{b:02x}")).collect::<String>())
    }
}

/// The payload a caller embeds in the hook data blob, JSON-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookData {
    /// The proof artifact as produced by the proving system.
    pub proof_artifact: Vec<u8>,
    /// The proof's public signals in wire shape.
    pub public_signals: Vec<u8>,
}

impl HookData {
    /// Encode for transport through the dispatcher.
    pub fn encode(&self) -> Vec<u8> {
        // Serializing Vec<u8> fields to JSON cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode a blob received through the dispatcher.
    pub fn decode(bytes: &[u8]) -> Result<Self, GateError> {
        serde_json::from_slice(bytes)
            .map_err(|e| GateError::InvalidPublicSignals(format!("malformed hook data: {e}")))
    }
}

/// Callbacks the AMM dispatcher invokes around protected operations.
pub trait PoolHooks {
    /// Gate a swap before it executes.
    fn before_swap(&mut self, ctx: TxContext, pool: &PoolKey, hook_data: &[u8]) -> Result<(), GateError>;

    /// Observe a swap after it executed.
    fn after_swap(&mut self, ctx: TxContext, pool: &PoolKey, hook_data: &[u8]) -> Result<(), GateError>;

    /// Gate a liquidity addition before it executes.
    fn before_add_liquidity(
        &mut self,
        ctx: TxContext,
        pool: &PoolKey,
        hook_data: &[u8],
    ) -> Result<(), GateError>;

    /// Observe a liquidity addition after it executed.
    fn after_add_liquidity(
        &mut self,
        ctx: TxContext,
        pool: &PoolKey,
        hook_data: &[u8],
    ) -> Result<(), GateError>;
}

impl<P: ProvingSystem> ComplianceGate<P> {
    /// The shared gating logic of the before-callbacks: fast path on a
    /// standing record, otherwise inline proof submission. Fail-closed.
    fn authorize(&mut self, ctx: TxContext, hook_data: &[u8]) -> Result<(), GateError> {
        if !self.is_enabled() {
            return Err(GateError::HookNotEnabled);
        }
        if self.check_compliance(ctx.caller, ctx.now).is_compliant {
            return Ok(());
        }
        let payload = HookData::decode(hook_data)?;
        self.submit_proof(ctx, &payload.proof_artifact, &payload.public_signals)
    }
}

impl<P: ProvingSystem> PoolHooks for ComplianceGate<P> {
    fn before_swap(&mut self, ctx: TxContext, pool: &PoolKey, hook_data: &[u8]) -> Result<(), GateError> {
        tracing::debug!(target: "covenant::hook", caller = %ctx.caller, pool = %pool, "before_swap");
        self.authorize(ctx, hook_data)
    }

    fn after_swap(&mut self, _ctx: TxContext, _pool: &PoolKey, _hook_data: &[u8]) -> Result<(), GateError> {
        Ok(())
    }

    fn before_add_liquidity(
        &mut self,
        ctx: TxContext,
        pool: &PoolKey,
        hook_data: &[u8],
    ) -> Result<(), GateError> {
        tracing::debug!(target: "covenant::hook", caller = %ctx.caller, pool = %pool, "before_add_liquidity");
        self.authorize(ctx, hook_data)
    }

    fn after_add_liquidity(
        &mut self,
        _ctx: TxContext,
        _pool: &PoolKey,
        _hook_data: &[u8],
    ) -> Result<(), GateError> {
        Ok(())
    }
}
