use super::{Venue, VenueError, VenueProtocol};
use crate::constants::BPS_DENOMINATOR;
use crate::ledger::{BalanceView, LedgerFrame};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolValue, sol};
use serde::{Deserialize, Serialize};
use tracing::debug;

sol! {
    /// Lending-market liquidation calldata: repay `debtToCover` of the user's
    /// debt, receive discounted collateral in return.
    #[derive(Debug)]
    struct LiquidationCall {
        address collateralAsset;
        address debtAsset;
        address user;
        uint256 debtToCover;
    }
}

/// Liquidation venue: the caller covers debt-asset exposure and seizes
/// collateral at a fixed rational price plus a liquidation bonus. Collateral
/// inventory is the venue's ledger balance; an under-collateralized venue
/// simply fails the transfer and the frame unwinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiquidationVenue {
    pub address: Address,
    pub collateral_asset: Address,
    pub debt_asset: Address,
    /// Collateral units paid per debt unit, as price_num / price_den.
    pub price_num: U256,
    pub price_den: U256,
    pub bonus_bps: u32,
}

impl LiquidationVenue {
    pub fn new(
        address: Address,
        collateral_asset: Address,
        debt_asset: Address,
        price_num: U256,
        price_den: U256,
        bonus_bps: u32,
    ) -> Self {
        Self { address, collateral_asset, debt_asset, price_num, price_den, bonus_bps }
    }

    pub fn encode_call(
        collateral_asset: Address,
        debt_asset: Address,
        user: Address,
        debt_to_cover: U256,
    ) -> Bytes {
        LiquidationCall { collateralAsset: collateral_asset, debtAsset: debt_asset, user, debtToCover: debt_to_cover }
            .abi_encode()
            .into()
    }

    fn seized_collateral(&self, debt_to_cover: U256) -> Result<U256, VenueError> {
        if debt_to_cover.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        if self.price_den.is_zero() {
            return Err(VenueError::EmptyReserves);
        }
        let at_price = debt_to_cover * self.price_num / self.price_den;
        Ok(at_price * U256::from(BPS_DENOMINATOR + self.bonus_bps as u64) / U256::from(BPS_DENOMINATOR))
    }
}

#[typetag::serde]
impl Venue for LiquidationVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn protocol(&self) -> VenueProtocol {
        VenueProtocol::Liquidation
    }

    fn tokens(&self) -> Vec<Address> {
        vec![self.debt_asset, self.collateral_asset]
    }

    fn swap_directions(&self) -> Vec<(Address, Address)> {
        // One-way: debt in, collateral out.
        vec![(self.debt_asset, self.collateral_asset)]
    }

    fn execute(
        &self,
        frame: &mut LedgerFrame<'_>,
        caller: Address,
        input: &[u8],
    ) -> Result<U256, VenueError> {
        let call = LiquidationCall::abi_decode_validate(input)?;
        if call.debtAsset != self.debt_asset || call.collateralAsset != self.collateral_asset {
            return Err(VenueError::UnsupportedPair {
                token_in: call.debtAsset,
                token_out: call.collateralAsset,
            });
        }

        let seized = self.seized_collateral(call.debtToCover)?;
        frame.transfer_from(call.debtAsset, caller, self.address, self.address, call.debtToCover)?;
        frame.transfer(call.collateralAsset, self.address, caller, seized)?;

        debug!(
            venue = %self.address,
            user = %call.user,
            debt_to_cover = %call.debtToCover,
            %seized,
            "liquidation call"
        );
        Ok(seized)
    }

    fn quote(
        &self,
        _view: &dyn BalanceView,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VenueError> {
        if token_in != self.debt_asset || token_out != self.collateral_asset {
            return Err(VenueError::UnsupportedPair { token_in, token_out });
        }
        self.seized_collateral(amount_in)
    }
}
