use crate::codec::CodecError;
use crate::ledger::LedgerError;
use crate::venues::VenueError;
use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Everything that can abort a unit of work. Every variant unwinds the whole
/// frame: there is no local recovery and no partial-success state.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("caller does not hold the owner capability")]
    NotOwner,

    #[error("reentrant call while the engine is mid-flight")]
    ReentrantCall,

    #[error("loan callback from {caller}, which is not the configured pool")]
    UnauthorizedCaller { caller: Address },

    #[error("loan initiated by {initiator}, not by this engine")]
    UnauthorizedInitiator { initiator: Address },

    #[error("malformed route parameters: {0}")]
    MalformedParams(#[from] CodecError),

    #[error("swap leg {leg} failed: {source}")]
    SwapLegFailed {
        leg: u8,
        #[source]
        source: VenueError,
    },

    #[error("final balance {have} cannot repay {need}")]
    InsufficientRepayment { have: U256, need: U256 },

    #[error("profit {profit} below caller floor {floor}")]
    ProfitBelowFloor { profit: U256, floor: U256 },

    #[error("pool cannot fund a loan of {requested} {asset}, has {available}")]
    InsufficientLiquidity { asset: Address, requested: U256, available: U256 },

    #[error("repayment pull failed: {0}")]
    RepaymentPullFailed(#[source] LedgerError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
