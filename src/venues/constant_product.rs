use super::{Venue, VenueError, VenueProtocol};
use crate::constants::BPS_DENOMINATOR;
use crate::ledger::{BalanceView, LedgerFrame};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolValue, sol};
use serde::{Deserialize, Serialize};
use tracing::debug;

sol! {
    /// Router-style calldata for a fixed-input swap.
    #[derive(Debug, PartialEq, Eq)]
    struct SwapExactIn {
        uint256 amountIn;
        uint256 amountOutMin;
        address tokenIn;
        address tokenOut;
    }
}

/// x*y=k venue over a single token pair, fee taken from the input side in
/// basis points. Reserves are the venue's own ledger balances, so every swap
/// stays inside the caller's frame and unwinds with it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstantProductVenue {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee_bps: u32,
}

impl ConstantProductVenue {
    pub fn new(address: Address, token0: Address, token1: Address, fee_bps: u32) -> Self {
        Self { address, token0, token1, fee_bps }
    }

    /// Build the opaque calldata this venue expects.
    pub fn encode_swap(
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out_min: U256,
    ) -> Bytes {
        SwapExactIn { amountIn: amount_in, amountOutMin: amount_out_min, tokenIn: token_in, tokenOut: token_out }
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
        // amount_out = (in * (1 - fee) * reserve_out) / (reserve_in + in * (1 - fee))
        let amount_in_with_fee = amount_in * U256::from(BPS_DENOMINATOR - self.fee_bps as u64);
        let numerator = amount_in_with_fee * reserve_out;
        let denominator = reserve_in * U256::from(BPS_DENOMINATOR) + amount_in_with_fee;
        Ok(numerator / denominator)
    }
}

#[typetag::serde]
impl Venue for ConstantProductVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn protocol(&self) -> VenueProtocol {
        VenueProtocol::ConstantProduct
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
        let call = SwapExactIn::abi_decode_validate(input)?;
        self.check_pair(call.tokenIn, call.tokenOut)?;

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
            amount_in = %call.amountIn,
            %amount_out,
            "constant-product swap"
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
