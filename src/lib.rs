// Layered architecture, leaves first
pub mod ledger;   // State layer: durable balances/allowances, write-ahead frames
pub mod venues;   // Venue layer: swap-executor capabilities and their registry
pub mod lending;  // Loan layer: flash-loan issuance and repayment
pub mod engine;   // Core: the borrow -> swap -> swap -> verify -> repay machine

// Supporting modules
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod token;
pub mod utils;

// Re-export key components from each layer
pub use codec::{CodecError, RoutePlan, SwapInstruction};
pub use config::{BalanceSeed, EngineConfigSection, PoolConfigSection, World, WorldConfigRoot};
pub use engine::{ArbitrageEngine, OwnerGate, OwnerToken, ReentrancyGuard, TradePhase, TradeReport};
pub use error::EngineError;
pub use ledger::{BalanceView, LedgerError, LedgerFrame, TokenLedger};
pub use lending::{FlashLoanReceipt, FlashLoanReceiver, LendingPool};
pub use token::{Token, TokenWrapper};
pub use venues::{
    ConcentratedLiquidityVenue, ConstantProductVenue, LiquidationVenue, MockVenue, Venue,
    VenueError, VenueProtocol, VenueRegistry,
};
