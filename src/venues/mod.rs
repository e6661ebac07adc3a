pub mod concentrated;
pub mod constant_product;
pub mod liquidation;
pub mod mock_venue;

pub use concentrated::{ConcentratedLiquidityVenue, ExactInputSingle};
pub use constant_product::{ConstantProductVenue, SwapExactIn};
pub use liquidation::{LiquidationCall, LiquidationVenue};
pub use mock_venue::MockVenue;

use crate::ledger::{BalanceView, LedgerError, LedgerFrame};
use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, EnumIter, Default, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueProtocol {
    #[default]
    Unknown,
    ConstantProduct,
    ConcentratedLiquidity,
    Liquidation,
}

#[derive(Debug, Error)]
pub enum VenueError {
    #[error("no venue registered at {0}")]
    UnknownVenue(Address),
    #[error("venue already registered at {0}")]
    DuplicateVenue(Address),
    #[error("malformed venue call data: {0}")]
    MalformedCallData(#[from] alloy_sol_types::Error),
    #[error("venue does not trade {token_in} -> {token_out}")]
    UnsupportedPair { token_in: Address, token_out: Address },
    #[error("fee tier mismatch: venue charges {expected} pips, call named {got}")]
    FeeTierMismatch { expected: u32, got: u32 },
    #[error("zero swap amount")]
    ZeroAmount,
    #[error("venue has no reserves for the requested side")]
    EmptyReserves,
    #[error("output {amount_out} below minimum {min_out}")]
    SlippageExceeded { amount_out: U256, min_out: U256 },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A swap-executor capability: one variant per supported venue protocol.
///
/// A venue interprets its own opaque call data, pulls the input leg from the
/// caller via its allowance, and pays the output leg out of its ledger-held
/// inventory. The returned amount is whatever the venue *claims* it paid out;
/// callers that care about correctness measure their own balance instead.
#[typetag::serde(tag = "type")]
pub trait Venue: Send + Sync {
    fn address(&self) -> Address;

    fn protocol(&self) -> VenueProtocol {
        VenueProtocol::Unknown
    }

    fn tokens(&self) -> Vec<Address>;

    fn swap_directions(&self) -> Vec<(Address, Address)>;

    /// Execute the opaque call against the frame on behalf of `caller`.
    fn execute(
        &self,
        frame: &mut LedgerFrame<'_>,
        caller: Address,
        input: &[u8],
    ) -> Result<U256, VenueError>;

    /// Price `amount_in` against current reserves without touching state.
    fn quote(
        &self,
        view: &dyn BalanceView,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VenueError>;
}

impl std::fmt::Debug for dyn Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Venue")
            .field("address", &self.address())
            .field("protocol", &self.protocol())
            .finish()
    }
}

/// Resolves opaque call targets to venue capabilities.
#[derive(Default, Debug)]
pub struct VenueRegistry {
    venues: DashMap<Address, Arc<dyn Venue>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, venue: Arc<dyn Venue>) -> Result<(), VenueError> {
        let address = venue.address();
        if self.venues.contains_key(&address) {
            return Err(VenueError::DuplicateVenue(address));
        }
        self.venues.insert(address, venue);
        Ok(())
    }

    pub fn resolve(&self, address: Address) -> Result<Arc<dyn Venue>, VenueError> {
        self.venues
            .get(&address)
            .map(|entry| entry.value().clone())
            .ok_or(VenueError::UnknownVenue(address))
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}
