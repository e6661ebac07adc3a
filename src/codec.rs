use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolValue, sol};
use serde::{Deserialize, Serialize};
use thiserror::Error;

sol! {
    struct RoutePlanData {
        address venueA;
        bytes dataA;
        address intermediateAsset;
        address venueB;
        bytes dataB;
        uint256 minProfit;
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("route plan does not decode: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

/// One opaque swap leg: a call target and calldata only that target can
/// interpret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInstruction {
    pub target: Address,
    pub call_data: Bytes,
}

impl SwapInstruction {
    pub fn new(target: Address, call_data: Bytes) -> Self {
        Self { target, call_data }
    }
}

/// The full decoded parameter tuple carried through the loan callback:
/// two legs, the asset bridging them, and the caller's profit floor.
///
/// Encode and decode are exact inverses. Decoding fails closed on malformed
/// or truncated input; there are no defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub leg_a: SwapInstruction,
    pub intermediate_asset: Address,
    pub leg_b: SwapInstruction,
    pub min_profit: U256,
}

impl RoutePlan {
    pub fn new(
        leg_a: SwapInstruction,
        intermediate_asset: Address,
        leg_b: SwapInstruction,
        min_profit: U256,
    ) -> Self {
        Self { leg_a, intermediate_asset, leg_b, min_profit }
    }

    pub fn encode(&self) -> Bytes {
        RoutePlanData {
            venueA: self.leg_a.target,
            dataA: self.leg_a.call_data.clone(),
            intermediateAsset: self.intermediate_asset,
            venueB: self.leg_b.target,
            dataB: self.leg_b.call_data.clone(),
            minProfit: self.min_profit,
        }
        .abi_encode()
        .into()
    }

    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let raw = RoutePlanData::abi_decode_validate(data)?;
        Ok(Self {
            leg_a: SwapInstruction::new(raw.venueA, raw.dataA),
            intermediate_asset: raw.intermediateAsset,
            leg_b: SwapInstruction::new(raw.venueB, raw.dataB),
            min_profit: raw.minProfit,
        })
    }
}
