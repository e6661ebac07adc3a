use alloy_primitives::{Address, U256, address};

pub const USDC: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

pub const WETH: Address = address!("0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619");

pub const NATIVE: Address = Address::ZERO;

/// Fee denominators: venue fees are quoted in basis points, concentrated-liquidity
/// tiers in pips.
pub const BPS_DENOMINATOR: u64 = 10_000;
pub const PIPS_DENOMINATOR: u64 = 1_000_000;

/// Default flash-loan premium, 0.09% of the principal.
pub const DEFAULT_FLASH_PREMIUM_BPS: u32 = 9;

/// Default liquidation bonus, 5% of the covered debt.
pub const DEFAULT_LIQUIDATION_BONUS_BPS: u32 = 500;

pub fn bps_of(amount: U256, bps: u32) -> U256 {
    amount * U256::from(bps) / U256::from(BPS_DENOMINATOR)
}

#[non_exhaustive]
pub struct PolygonTokenAddress;

impl PolygonTokenAddress {
    pub const USDC: Address = USDC;
    pub const USDT: Address = address!("c2132d05d31c914a87c6611c10748aeb04b58e8f");
    pub const DAI: Address = address!("8f3cf7ad23cd3cadbd9735aff958023239c6a063");
    pub const WETH: Address = WETH;
    pub const WMATIC: Address = address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270");
}

#[non_exhaustive]
pub struct PolygonVenueAddress;

impl PolygonVenueAddress {
    // Uniswap V2 compatible routers
    pub const QUICKSWAP: Address = address!("a5e0829caced8ffdd4de3c43696c57f7d7a678ff");
    pub const SUSHISWAP: Address = address!("1b02da8cb0d097eb8d57a175b88c7d8b47997506");

    // Aave V3
    pub const AAVE_POOL: Address = address!("794a61358d6845594f94dc1db02a252b5b4814ad");
}
