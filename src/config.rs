use crate::engine::{ArbitrageEngine, OwnerToken};
use crate::ledger::TokenLedger;
use crate::lending::LendingPool;
use crate::token::{Token, TokenWrapper};
use crate::utils::config_loader::{
    ConfigSectionLoader, ConfigSectionLoaderSync, LoadConfigError, load_from_file, load_from_file_sync,
};
use crate::venues::{Venue, VenueError, VenueRegistry};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Whole-world TOML configuration: the engine and pool identities, venue
/// definitions (typetag-tagged by protocol implementation), token metadata,
/// and initial balance seeding.
#[derive(Deserialize)]
pub struct WorldConfigRoot {
    pub engine: EngineConfigSection,
    pub pool: PoolConfigSection,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub venues: Vec<Box<dyn Venue>>,
    #[serde(default)]
    pub balances: Vec<BalanceSeed>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfigSection {
    pub address: Address,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfigSection {
    pub address: Address,
    pub premium_bps: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalanceSeed {
    pub asset: Address,
    pub holder: Address,
    pub amount: U256,
}

/// An assembled world: ledger, pool, venue registry, and the engine wired to
/// all three.
#[derive(Debug)]
pub struct World {
    pub ledger: Arc<TokenLedger>,
    pub pool: Arc<LendingPool>,
    pub venues: Arc<VenueRegistry>,
    pub engine: ArbitrageEngine,
    tokens: HashMap<Address, TokenWrapper>,
}

impl World {
    pub fn token(&self, address: Address) -> Option<TokenWrapper> {
        self.tokens.get(&address).cloned()
    }

    /// Human-readable amount using configured token metadata, raw units
    /// otherwise.
    pub fn display_amount(&self, asset: Address, amount: U256) -> String {
        match self.tokens.get(&asset) {
            Some(token) => format!("{} {}", token.to_float(amount), token.get_symbol()),
            None => format!("{amount} @{asset}"),
        }
    }
}

impl WorldConfigRoot {
    /// Build the world this configuration describes and mint the engine's
    /// owner capability.
    pub fn assemble(self) -> Result<(World, OwnerToken), VenueError> {
        let ledger = Arc::new(TokenLedger::new());
        let pool = Arc::new(LendingPool::new(self.pool.address, self.pool.premium_bps));

        let registry = Arc::new(VenueRegistry::new());
        for venue in self.venues {
            registry.register(Arc::from(venue))?;
        }

        for seed in &self.balances {
            ledger.credit(seed.asset, seed.holder, seed.amount);
        }

        let tokens: HashMap<Address, TokenWrapper> =
            self.tokens.into_iter().map(|token| (token.get_address(), Arc::new(token))).collect();

        let (engine, owner) =
            ArbitrageEngine::new(self.engine.address, pool.clone(), registry.clone());

        info!(
            engine = %engine.address(),
            pool = %pool.address(),
            venues = registry.len(),
            seeded_balances = self.balances.len(),
            "world assembled"
        );
        Ok((
            World { ledger, pool, venues: registry, engine, tokens },
            owner,
        ))
    }
}

#[async_trait]
impl ConfigSectionLoader for WorldConfigRoot {
    type SectionType = WorldConfigRoot;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file(file_name).await
    }
}

impl ConfigSectionLoaderSync for WorldConfigRoot {
    type SectionType = WorldConfigRoot;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file_sync(file_name)
    }
}
