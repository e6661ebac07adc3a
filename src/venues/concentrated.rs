use super::{Venue, VenueError, VenueProtocol};
use crate::constants::PIPS_DENOMINATOR;
use crate::ledger::{BalanceView, LedgerFrame};
use alloy_primitives::{Address, Bytes, U256, aliases::U24};
use alloy_sol_types::{SolValue, sol};
use serde::{Deserialize, Serialize};
use tracing::debug;

sol! {
    /// Single-pool exact-input calldata, fee tier named explicitly.
    #[derive(Debug)]
    struct ExactInputSingle {
        address tokenIn;
        address tokenOut;
        uint24 fee;
        uint256 amountIn;
        uint256 amountOutMin;
    }
}

/// Concentrated-liquidity venue reduced to its fee behavior: the tier is
/// charged in pips on the input, then the swap prices against the venue's
/// ledger-held virtual reserves. Tick-level liquidity is out of scope for a
/// simulated world; the fee units and routing-by-tier semantics are kept.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConcentratedLiquidityVenue {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee_pips: u32,
}

impl ConcentratedLiquidityVenue {
    pub fn new(address: Address, token0: Address, token1: Address, fee_pips: u32) -> Self {
        Self { address, token0, token1, fee_pips }
    }

    pub fn encode_swap(
        token_in: Address,
        token_out: Address,
        fee_pips: u32,
        amount_in: U256,
        amount_out_min: U256,
    ) -> Bytes {
        ExactInputSingle {
            tokenIn: token_in,
            tokenOut: token_out,
            fee: U24::from(fee_pips),
            amountIn: amount_in,
            amountOutMin: amount_out_min,
        }
        .abi_encode()
        .into()
    }

    fn check_pair(&self, token_in: Address, token_out: Address) -> Result<(), VenueError> {
        let supported = (token_in == self.token0 && token_out == self.token1)
            || (token_in == self.token1 && token_out == self.token0);
        if supported { Ok(()) } else { Err(VenueError::UnsupportedPair { token_in, token_out }) }
    }

    fn amount_out(&self, reserve_in: U256, reserve_out: U256, amount_in: U256) -> Result<U256, VenueError> {
        if amount_in.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(VenueError::EmptyReserves);
        }
        let amount_in_after_fee =
            amount_in * U256::from(PIPS_DENOMINATOR - self.fee_pips as u64) / U256::from(PIPS_DENOMINATOR);
        if amount_in_after_fee.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        Ok(amount_in_after_fee * reserve_out / (reserve_in + amount_in_after_fee))
    }
}

#[typetag::serde]
impl Venue for ConcentratedLiquidityVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn protocol(&self) -> VenueProtocol {
        VenueProtocol::ConcentratedLiquidity
    }

    fn tokens(&self) -> Vec<Address> {
        vec![self.token0, self.token1]
    }

    fn swap_directions(&self) -> Vec<(Address, Address)> {
        vec![(self.token0, self.token1), (self.token1, self.token0)]
    }

    fn execute(
        &self,
        frame: &mut LedgerFrame<'_>,
        caller: Address,
        input: &[u8],
    ) -> Result<U256, VenueError> {
        let call = ExactInputSingle::abi_decode_validate(input)?;
        self.check_pair(call.tokenIn, call.tokenOut)?;
        let named_fee = call.fee.to::<u32>();
        if named_fee != self.fee_pips {
            return Err(VenueError::FeeTierMismatch { expected: self.fee_pips, got: named_fee });
        }

        let reserve_in = frame.balance_of(call.tokenIn, self.address);
        let reserve_out = frame.balance_of(call.tokenOut, self.address);
        let amount_out = self.amount_out(reserve_in, reserve_out, call.amountIn)?;
        if amount_out < call.amountOutMin {
            return Err(VenueError::SlippageExceeded { amount_out, min_out: call.amountOutMin });
        }

        frame.transfer_from(call.tokenIn, caller, self.address, self.address, call.amountIn)?;
        frame.transfer(call.tokenOut, self.address, caller, amount_out)?;

        debug!(
            venue = %self.address,
            token_in = %call.tokenIn,
            token_out = %call.tokenOut,
            fee_pips = named_fee,
            amount_in = %call.amountIn,
            %amount_out,
            "concentrated-liquidity swap"
        );
        Ok(amount_out)
    }

    fn quote(
        &self,
        view: &dyn BalanceView,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VenueError> {
        self.check_pair(token_in, token_out)?;
        let reserve_in = view.balance_of(token_in, self.address);
        let reserve_out = view.balance_of(token_out, self.address);
        self.amount_out(reserve_in, reserve_out, amount_in)
    }
}
