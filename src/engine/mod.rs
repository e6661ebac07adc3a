pub mod access;
pub mod guard;

pub use access::{OwnerGate, OwnerToken};
pub use guard::{GuardPermit, ReentrancyGuard};

use crate::codec::RoutePlan;
use crate::error::EngineError;
use crate::ledger::{BalanceView, LedgerFrame, TokenLedger};
use crate::lending::{FlashLoanReceiver, LendingPool};
use crate::venues::VenueRegistry;
use alloy_primitives::{Address, Bytes, U256};
use std::sync::Arc;
use strum_macros::Display;
use tracing::{debug, info, warn};

/// Where a trade currently stands. One borrow-swap-swap-verify-repay pass
/// walks the phases in order; failure from any of them lands in `Reverted`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TradePhase {
    Idle,
    Borrowing,
    Leg1Swapping,
    Leg2Swapping,
    Verifying,
    Repaying,
    Committed,
    Reverted,
}

/// Per-invocation scratch state. Lives only for the duration of one loan
/// callback and is never persisted; its numbers all come from measuring the
/// frame, not from anything a venue claimed.
#[derive(Debug)]
struct ExecutionContext {
    phase: TradePhase,
    asset: Address,
    borrowed_amount: U256,
    premium: U256,
    intermediate_balance: U256,
    final_balance: U256,
    amount_owed: U256,
    profit: U256,
}

impl ExecutionContext {
    fn new(asset: Address, borrowed_amount: U256, premium: U256) -> Self {
        Self {
            phase: TradePhase::Borrowing,
            asset,
            borrowed_amount,
            premium,
            intermediate_balance: U256::ZERO,
            final_balance: U256::ZERO,
            amount_owed: U256::ZERO,
            profit: U256::ZERO,
        }
    }

    fn advance(&mut self, phase: TradePhase) {
        debug!(from = %self.phase, to = %phase, asset = %self.asset, "phase");
        self.phase = phase;
    }
}

/// Outcome of a committed trade, measured from durable balance deltas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeReport {
    pub asset: Address,
    pub borrowed: U256,
    pub premium: U256,
    pub repaid: U256,
    pub profit: U256,
}

/// The flash-loan receiver at the center of the protocol.
///
/// `trigger` borrows from the pool; the pool calls straight back into
/// [`FlashLoanReceiver::on_loan_received`], which runs both swap legs against
/// resolved venues, verifies the profit invariant from measured balances, and
/// approves repayment. The whole pass lives inside the pool's frame: one
/// commit on success, nothing durable on any failure.
#[derive(Debug)]
pub struct ArbitrageEngine {
    address: Address,
    pool: Arc<LendingPool>,
    venues: Arc<VenueRegistry>,
    gate: OwnerGate,
    guard: ReentrancyGuard,
}

impl ArbitrageEngine {
    /// Build the engine and mint its one owner capability.
    pub fn new(
        address: Address,
        pool: Arc<LendingPool>,
        venues: Arc<VenueRegistry>,
    ) -> (Self, OwnerToken) {
        let (gate, token) = OwnerGate::mint();
        let engine = Self { address, pool, venues, gate, guard: ReentrancyGuard::new() };
        (engine, token)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn pool(&self) -> &LendingPool {
        &self.pool
    }

    /// Borrow `amount` of `asset` and run the route carried in `params`.
    ///
    /// Owner-only; rejects re-entry while a trade is mid-flight. `params` is
    /// forwarded to the pool opaquely and only decoded inside the callback.
    pub fn trigger(
        &self,
        owner: &OwnerToken,
        ledger: &TokenLedger,
        asset: Address,
        amount: U256,
        params: Bytes,
    ) -> Result<TradeReport, EngineError> {
        self.gate.require(owner)?;
        let _permit = self.guard.enter()?;

        info!(%asset, %amount, "requesting flash loan");
        let balance_before = ledger.balance_of(asset, self.address);

        let receipt = self
            .pool
            .flash_loan_simple(ledger, self.address, self, asset, amount, &params, 0)
            .inspect_err(|err| warn!(%asset, %amount, %err, phase = %TradePhase::Reverted, "trade unwound"))?;

        let profit = ledger.balance_of(asset, self.address).saturating_sub(balance_before);
        let report = TradeReport {
            asset,
            borrowed: receipt.amount,
            premium: receipt.premium,
            repaid: receipt.amount + receipt.premium,
            profit,
        };
        info!(
            %asset,
            borrowed = %report.borrowed,
            premium = %report.premium,
            profit = %report.profit,
            phase = %TradePhase::Committed,
            "trade committed"
        );
        Ok(report)
    }

    /// Sweep the engine's full residual balance of `asset` to `to`.
    pub fn withdraw(
        &self,
        owner: &OwnerToken,
        ledger: &TokenLedger,
        asset: Address,
        to: Address,
    ) -> Result<U256, EngineError> {
        self.gate.require(owner)?;
        let _permit = self.guard.enter()?;

        let mut frame = ledger.begin();
        let amount = frame.balance_of(asset, self.address);
        if !amount.is_zero() {
            frame.transfer(asset, self.address, to, amount)?;
        }
        frame.commit();
        info!(%asset, %amount, %to, "residual balance swept");
        Ok(amount)
    }

    fn leg_failed(leg: u8) -> impl FnOnce(crate::venues::VenueError) -> EngineError {
        move |source| EngineError::SwapLegFailed { leg, source }
    }
}

impl FlashLoanReceiver for ArbitrageEngine {
    fn address(&self) -> Address {
        self.address
    }

    fn on_loan_received(
        &self,
        frame: &mut LedgerFrame<'_>,
        caller: Address,
        asset: Address,
        amount: U256,
        premium: U256,
        initiator: Address,
        params: &Bytes,
    ) -> Result<(), EngineError> {
        if caller != self.pool.address() {
            return Err(EngineError::UnauthorizedCaller { caller });
        }
        // A loan this engine did not ask for is an attack on its standing
        // approvals, even when it arrives from the real pool.
        if initiator != self.address {
            return Err(EngineError::UnauthorizedInitiator { initiator });
        }

        let plan = RoutePlan::decode(params)?;
        let mut ctx = ExecutionContext::new(asset, amount, premium);

        ctx.advance(TradePhase::Leg1Swapping);
        let venue_a = self.venues.resolve(plan.leg_a.target).map_err(Self::leg_failed(1))?;
        frame.approve(asset, self.address, venue_a.address(), amount);
        venue_a.execute(frame, self.address, &plan.leg_a.call_data).map_err(Self::leg_failed(1))?;

        // Never trust a venue's returned output; measure what actually landed.
        ctx.intermediate_balance = frame.balance_of(plan.intermediate_asset, self.address);

        ctx.advance(TradePhase::Leg2Swapping);
        let venue_b = self.venues.resolve(plan.leg_b.target).map_err(Self::leg_failed(2))?;
        frame.approve(plan.intermediate_asset, self.address, venue_b.address(), ctx.intermediate_balance);
        venue_b.execute(frame, self.address, &plan.leg_b.call_data).map_err(Self::leg_failed(2))?;

        ctx.advance(TradePhase::Verifying);
        ctx.amount_owed = ctx.borrowed_amount + ctx.premium;
        ctx.final_balance = frame.balance_of(asset, self.address);
        if ctx.final_balance < ctx.amount_owed {
            return Err(EngineError::InsufficientRepayment {
                have: ctx.final_balance,
                need: ctx.amount_owed,
            });
        }
        ctx.profit = ctx.final_balance - ctx.amount_owed;
        if ctx.profit < plan.min_profit {
            return Err(EngineError::ProfitBelowFloor { profit: ctx.profit, floor: plan.min_profit });
        }

        ctx.advance(TradePhase::Repaying);
        frame.approve(asset, self.address, self.pool.address(), ctx.amount_owed);
        debug!(
            intermediate = %ctx.intermediate_balance,
            final_balance = %ctx.final_balance,
            owed = %ctx.amount_owed,
            profit = %ctx.profit,
            "repayment approved"
        );
        Ok(())
    }
}
