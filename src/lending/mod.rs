use crate::constants::{DEFAULT_FLASH_PREMIUM_BPS, bps_of};
use crate::error::EngineError;
use crate::ledger::{BalanceView, LedgerFrame, TokenLedger};
use alloy_primitives::{Address, Bytes, U256};
use tracing::{debug, info, warn};

/// Contract between the pool and whoever borrows from it. The callback runs
/// nested inside the pool's frame; an `Err` return fails the pool's whole
/// enclosing unit of work.
pub trait FlashLoanReceiver: Send + Sync {
    fn address(&self) -> Address;

    #[allow(clippy::too_many_arguments)]
    fn on_loan_received(
        &self,
        frame: &mut LedgerFrame<'_>,
        caller: Address,
        asset: Address,
        amount: U256,
        premium: U256,
        initiator: Address,
        params: &Bytes,
    ) -> Result<(), EngineError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashLoanReceipt {
    pub asset: Address,
    pub amount: U256,
    pub premium: U256,
}

/// Uncollateralized loan issuer. Opens the frame that makes one loan one
/// atomic unit of work: principal out, callback, principal plus premium back,
/// then commit; any failure anywhere in between drops the frame.
#[derive(Debug)]
pub struct LendingPool {
    address: Address,
    premium_bps: u32,
}

impl LendingPool {
    pub fn new(address: Address, premium_bps: u32) -> Self {
        Self { address, premium_bps }
    }

    pub fn with_default_premium(address: Address) -> Self {
        Self::new(address, DEFAULT_FLASH_PREMIUM_BPS)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn premium_bps(&self) -> u32 {
        self.premium_bps
    }

    /// Fee charged on top of a principal of `amount`.
    pub fn premium_for(&self, amount: U256) -> U256 {
        bps_of(amount, self.premium_bps)
    }

    /// Issue a flash loan of `amount` of `asset` to `receiver`.
    ///
    /// `initiator` is the principal that asked the pool for the loan; the
    /// receiver sees it verbatim and is expected to reject loans it did not
    /// initiate itself. `referral_code` is carried for interface fidelity and
    /// only logged.
    #[allow(clippy::too_many_arguments)]
    pub fn flash_loan_simple(
        &self,
        ledger: &TokenLedger,
        initiator: Address,
        receiver: &dyn FlashLoanReceiver,
        asset: Address,
        amount: U256,
        params: &Bytes,
        referral_code: u16,
    ) -> Result<FlashLoanReceipt, EngineError> {
        let premium = self.premium_for(amount);
        let amount_owed = amount + premium;
        debug!(%asset, %amount, %premium, %initiator, referral_code, "issuing flash loan");

        let mut frame = ledger.begin();

        let available = frame.balance_of(asset, self.address);
        if available < amount {
            return Err(EngineError::InsufficientLiquidity { asset, requested: amount, available });
        }
        frame.transfer(asset, self.address, receiver.address(), amount)?;

        receiver
            .on_loan_received(&mut frame, self.address, asset, amount, premium, initiator, params)
            .inspect_err(|err| warn!(%asset, %amount, %err, "flash loan callback failed, unwinding"))?;

        frame
            .transfer_from(asset, receiver.address(), self.address, self.address, amount_owed)
            .map_err(|err| {
                warn!(%asset, %amount_owed, %err, "repayment pull failed, unwinding");
                EngineError::RepaymentPullFailed(err)
            })?;

        frame.commit();
        info!(%asset, %amount, %premium, "flash loan repaid");
        Ok(FlashLoanReceipt { asset, amount, premium })
    }
}
