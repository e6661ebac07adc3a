use super::constant_product::SwapExactIn;
use super::{Venue, VenueError};
use crate::ledger::{BalanceView, LedgerFrame};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// Fixed-output venue for tests. Accepts router-style calldata, pulls the
/// input leg, pays a preconfigured output out of its inventory, and reports
/// whatever it was told to report, which lets tests model venues that
/// misstate their execution results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockVenue {
    pub address: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_out: U256,
    pub reported_out: Option<U256>,
}

impl MockVenue {
    pub fn new(address: Address, token_in: Address, token_out: Address, amount_out: U256) -> Self {
        Self { address, token_in, token_out, amount_out, reported_out: None }
    }

    /// Make the venue claim `reported` while actually paying `amount_out`.
    pub fn with_reported_output(mut self, reported: U256) -> Self {
        self.reported_out = Some(reported);
        self
    }

    pub fn encode_swap(&self, amount_in: U256) -> Bytes {
        super::ConstantProductVenue::encode_swap(self.token_in, self.token_out, amount_in, U256::ZERO)
    }
}

#[typetag::serde]
impl Venue for MockVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn tokens(&self) -> Vec<Address> {
        vec![self.token_in, self.token_out]
    }

    fn swap_directions(&self) -> Vec<(Address, Address)> {
        vec![(self.token_in, self.token_out)]
    }

    fn execute(
        &self,
        frame: &mut LedgerFrame<'_>,
        caller: Address,
        input: &[u8],
    ) -> Result<U256, VenueError> {
        let call = SwapExactIn::abi_decode_validate(input)?;
        if call.tokenIn != self.token_in || call.tokenOut != self.token_out {
            return Err(VenueError::UnsupportedPair { token_in: call.tokenIn, token_out: call.tokenOut });
        }
        frame.transfer_from(call.tokenIn, caller, self.address, self.address, call.amountIn)?;
        frame.transfer(call.tokenOut, self.address, caller, self.amount_out)?;
        Ok(self.reported_out.unwrap_or(self.amount_out))
    }

    fn quote(
        &self,
        _view: &dyn BalanceView,
        token_in: Address,
        token_out: Address,
        _amount_in: U256,
    ) -> Result<U256, VenueError> {
        if token_in != self.token_in || token_out != self.token_out {
            return Err(VenueError::UnsupportedPair { token_in, token_out });
        }
        Ok(self.amount_out)
    }
}
