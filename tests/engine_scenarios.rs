use alloy_primitives::{Address, Bytes, U256, address};
use eyre::Result;
use flash_arb::utils::config_loader::load_from_str;
use flash_arb::{
    ArbitrageEngine, BalanceView, ConstantProductVenue, EngineError, LedgerFrame, LendingPool,
    LiquidationVenue, OwnerToken, RoutePlan, SwapInstruction, TokenLedger, Venue, VenueError,
    VenueRegistry, WorldConfigRoot,
};
use std::sync::{Arc, Mutex};

const USDC: Address = address!("2791bca1f2de4661ed88a30c99a7a9449aa84174");
const WETH: Address = address!("7ceb23fd6bc0add59e62ac25578270cff1b9f619");
const POOL: Address = address!("00000000000000000000000000000000000000f0");
const ENGINE: Address = address!("00000000000000000000000000000000000000e0");
const VENUE_A: Address = address!("00000000000000000000000000000000000000aa");
const VENUE_B: Address = address!("00000000000000000000000000000000000000bb");

struct TwoVenueWorld {
    ledger: Arc<TokenLedger>,
    pool: Arc<LendingPool>,
    venues: Arc<VenueRegistry>,
    engine: Arc<ArbitrageEngine>,
    owner: OwnerToken,
    venue_a: ConstantProductVenue,
    venue_b: ConstantProductVenue,
}

/// Venue A sells WETH cheap, venue B buys it back dear; the spread is the
/// arbitrage the engine is meant to capture.
fn two_venue_world() -> TwoVenueWorld {
    let ledger = Arc::new(TokenLedger::new());
    let pool = Arc::new(LendingPool::new(POOL, 90));
    let venues = Arc::new(VenueRegistry::new());

    let venue_a = ConstantProductVenue::new(VENUE_A, USDC, WETH, 30);
    let venue_b = ConstantProductVenue::new(VENUE_B, USDC, WETH, 30);
    venues.register(Arc::new(venue_a.clone())).unwrap();
    venues.register(Arc::new(venue_b.clone())).unwrap();

    ledger.credit(USDC, POOL, U256::from(1_000_000u64));
    // Venue A prices WETH at ~0.5 USDC, venue B at ~1 USDC.
    ledger.credit(USDC, VENUE_A, U256::from(1_000_000u64));
    ledger.credit(WETH, VENUE_A, U256::from(2_000_000u64));
    ledger.credit(USDC, VENUE_B, U256::from(1_000_000u64));
    ledger.credit(WETH, VENUE_B, U256::from(1_000_000u64));

    let (engine, owner) = ArbitrageEngine::new(ENGINE, pool.clone(), venues.clone());
    TwoVenueWorld { ledger, pool, venues, engine: Arc::new(engine), owner, venue_a, venue_b }
}

/// Size the route the way an off-chain scanner would: quote leg 1 against
/// committed reserves, feed the result into leg 2's quote.
fn sized_route(world: &TwoVenueWorld, amount_in: U256, min_profit: U256) -> (Bytes, U256) {
    let intermediate = world
        .venue_a
        .quote(world.ledger.as_ref(), USDC, WETH, amount_in)
        .unwrap();
    let final_out = world
        .venue_b
        .quote(world.ledger.as_ref(), WETH, USDC, intermediate)
        .unwrap();

    let plan = RoutePlan::new(
        SwapInstruction::new(
            VENUE_A,
            ConstantProductVenue::encode_swap(USDC, WETH, amount_in, intermediate),
        ),
        WETH,
        SwapInstruction::new(
            VENUE_B,
            ConstantProductVenue::encode_swap(WETH, USDC, intermediate, final_out),
        ),
        min_profit,
    );
    (plan.encode(), final_out)
}

#[test]
fn test_spread_capture_end_to_end() -> Result<()> {
    let world = two_venue_world();
    let amount = U256::from(10_000);
    let (params, expected_out) = sized_route(&world, amount, U256::ZERO);

    let premium = world.pool.premium_for(amount);
    let report = world.engine.trigger(&world.owner, &world.ledger, USDC, amount, params)?;

    assert_eq!(report.borrowed, amount);
    assert_eq!(report.premium, premium);
    assert_eq!(report.profit, expected_out - amount - premium);
    assert!(report.profit > U256::ZERO);

    // Pool ends richer by exactly the premium; profit sits on the engine.
    assert_eq!(world.ledger.balance_of(USDC, POOL), U256::from(1_000_000u64) + premium);
    assert_eq!(world.ledger.balance_of(USDC, ENGINE), report.profit);
    Ok(())
}

#[test]
fn test_no_standing_approvals_survive_a_trade() -> Result<()> {
    let world = two_venue_world();
    let amount = U256::from(10_000);
    let (params, _) = sized_route(&world, amount, U256::ZERO);
    world.engine.trigger(&world.owner, &world.ledger, USDC, amount, params)?;

    // Grant-immediately-before-use with exact amounts: everything granted
    // during the trade was consumed in full.
    assert_eq!(world.ledger.allowance(USDC, ENGINE, VENUE_A), U256::ZERO);
    assert_eq!(world.ledger.allowance(WETH, ENGINE, VENUE_B), U256::ZERO);
    assert_eq!(world.ledger.allowance(USDC, ENGINE, POOL), U256::ZERO);
    Ok(())
}

#[test]
fn test_unmet_floor_leaves_world_untouched() {
    let world = two_venue_world();
    let amount = U256::from(10_000);
    let (params, _) = sized_route(&world, amount, U256::from(u64::MAX));

    let err = world.engine.trigger(&world.owner, &world.ledger, USDC, amount, params).unwrap_err();
    assert!(matches!(err, EngineError::ProfitBelowFloor { .. }));

    for (asset, holder, expected) in [
        (USDC, POOL, 1_000_000u64),
        (USDC, VENUE_A, 1_000_000),
        (WETH, VENUE_A, 2_000_000),
        (USDC, VENUE_B, 1_000_000),
        (WETH, VENUE_B, 1_000_000),
        (USDC, ENGINE, 0),
        (WETH, ENGINE, 0),
    ] {
        assert_eq!(world.ledger.balance_of(asset, holder), U256::from(expected), "{asset}/{holder}");
    }
}

#[test]
fn test_liquidation_leg_route() -> Result<()> {
    let ledger = Arc::new(TokenLedger::new());
    let pool = Arc::new(LendingPool::new(POOL, 90));
    let venues = Arc::new(VenueRegistry::new());

    // Leg 1 covers USDC debt and seizes WETH at a 5% bonus; leg 2 sells the
    // seized collateral back into a deep constant-product pool.
    let liquidation =
        LiquidationVenue::new(VENUE_A, WETH, USDC, U256::from(1), U256::from(1), 500);
    let exit_venue = ConstantProductVenue::new(VENUE_B, USDC, WETH, 30);
    venues.register(Arc::new(liquidation.clone())).unwrap();
    venues.register(Arc::new(exit_venue.clone())).unwrap();

    ledger.credit(USDC, POOL, U256::from(1_000_000u64));
    ledger.credit(WETH, VENUE_A, U256::from(100_000u64));
    ledger.credit(USDC, VENUE_B, U256::from(1_000_000u64));
    ledger.credit(WETH, VENUE_B, U256::from(1_000_000u64));

    let (engine, owner) = ArbitrageEngine::new(ENGINE, pool.clone(), venues);

    let debt_to_cover = U256::from(1000);
    let borrower = Address::repeat_byte(0xDD);
    let seized = liquidation.quote(ledger.as_ref(), USDC, WETH, debt_to_cover)?;
    let exit_out = exit_venue.quote(ledger.as_ref(), WETH, USDC, seized)?;

    let plan = RoutePlan::new(
        SwapInstruction::new(
            VENUE_A,
            LiquidationVenue::encode_call(WETH, USDC, borrower, debt_to_cover),
        ),
        WETH,
        SwapInstruction::new(
            VENUE_B,
            ConstantProductVenue::encode_swap(WETH, USDC, seized, exit_out),
        ),
        U256::ZERO,
    );

    let report = engine.trigger(&owner, &ledger, USDC, debt_to_cover, plan.encode())?;
    let owed = debt_to_cover + pool.premium_for(debt_to_cover);
    assert_eq!(report.profit, exit_out - owed);
    assert!(report.profit > U256::ZERO);

    // The sweep hands the measured profit to the treasury.
    let treasury = Address::repeat_byte(0x77);
    let swept = engine.withdraw(&owner, &ledger, USDC, treasury)?;
    assert_eq!(swept, report.profit);
    assert_eq!(ledger.balance_of(USDC, treasury), report.profit);
    Ok(())
}

#[test]
fn test_config_built_world_executes() -> Result<()> {
    const WORLD: &str = r#"
[engine]
address = "0x00000000000000000000000000000000000000e0"

[pool]
address = "0x00000000000000000000000000000000000000f0"
premium_bps = 90

[[tokens]]
address = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
decimals = 6
symbol = "USDC"

[[venues]]
type = "ConstantProductVenue"
address = "0x00000000000000000000000000000000000000aa"
token0 = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
token1 = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619"
fee_bps = 30

[[venues]]
type = "ConstantProductVenue"
address = "0x00000000000000000000000000000000000000bb"
token0 = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
token1 = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619"
fee_bps = 30

[[balances]]
asset = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
holder = "0x00000000000000000000000000000000000000f0"
amount = "1000000"

[[balances]]
asset = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
holder = "0x00000000000000000000000000000000000000aa"
amount = "1000000"

[[balances]]
asset = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619"
holder = "0x00000000000000000000000000000000000000aa"
amount = "2000000"

[[balances]]
asset = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174"
holder = "0x00000000000000000000000000000000000000bb"
amount = "1000000"

[[balances]]
asset = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619"
holder = "0x00000000000000000000000000000000000000bb"
amount = "1000000"
"#;

    let root: WorldConfigRoot = load_from_str(WORLD)?;
    let (world, owner) = root.assemble()?;

    let amount = U256::from(10_000);
    let venue_a = world.venues.resolve(VENUE_A)?;
    let venue_b = world.venues.resolve(VENUE_B)?;
    let intermediate = venue_a.quote(world.ledger.as_ref(), USDC, WETH, amount)?;
    let final_out = venue_b.quote(world.ledger.as_ref(), WETH, USDC, intermediate)?;

    let plan = RoutePlan::new(
        SwapInstruction::new(VENUE_A, ConstantProductVenue::encode_swap(USDC, WETH, amount, intermediate)),
        WETH,
        SwapInstruction::new(VENUE_B, ConstantProductVenue::encode_swap(WETH, USDC, intermediate, final_out)),
        U256::ZERO,
    );

    let report = world.engine.trigger(&owner, &world.ledger, USDC, amount, plan.encode())?;
    assert_eq!(report.profit, final_out - amount - world.pool.premium_for(amount));
    assert!(world.display_amount(USDC, report.profit).ends_with("USDC"));
    Ok(())
}

/// Venue that turns around and calls `trigger` on the engine mid-swap,
/// recording what the engine told it before failing its own leg.
struct ReentrantAttackVenue {
    address: Address,
    engine: Arc<ArbitrageEngine>,
    owner: OwnerToken,
    ledger: Arc<TokenLedger>,
    inner_params: Bytes,
    observed: Mutex<Option<EngineError>>,
}

impl serde::Serialize for ReentrantAttackVenue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        serializer.serialize_struct("ReentrantAttackVenue", 0)?.end()
    }
}

impl<'de> serde::Deserialize<'de> for ReentrantAttackVenue {
    fn deserialize<D: serde::Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(serde::de::Error::custom("attack venue exists only in-process"))
    }
}

#[typetag::serde]
impl Venue for ReentrantAttackVenue {
    fn address(&self) -> Address {
        self.address
    }

    fn tokens(&self) -> Vec<Address> {
        vec![USDC, WETH]
    }

    fn swap_directions(&self) -> Vec<(Address, Address)> {
        vec![(USDC, WETH)]
    }

    fn execute(
        &self,
        _frame: &mut LedgerFrame<'_>,
        _caller: Address,
        _input: &[u8],
    ) -> Result<U256, VenueError> {
        let inner = self
            .engine
            .trigger(&self.owner, &self.ledger, USDC, U256::from(1), self.inner_params.clone())
            .unwrap_err();
        *self.observed.lock().unwrap() = Some(inner);
        Err(VenueError::ZeroAmount)
    }

    fn quote(
        &self,
        _view: &dyn BalanceView,
        _token_in: Address,
        _token_out: Address,
        _amount_in: U256,
    ) -> Result<U256, VenueError> {
        Err(VenueError::ZeroAmount)
    }
}

#[test]
fn test_reentrant_trigger_from_inside_a_swap_is_rejected() {
    let world = two_venue_world();
    let attack_address = Address::repeat_byte(0x66);
    let (inner_params, _) = sized_route(&world, U256::from(1), U256::ZERO);

    let attack = Arc::new(ReentrantAttackVenue {
        address: attack_address,
        engine: world.engine.clone(),
        owner: world.owner.clone(),
        ledger: world.ledger.clone(),
        inner_params,
        observed: Mutex::new(None),
    });
    world.venues.register(attack.clone()).unwrap();

    let plan = RoutePlan::new(
        SwapInstruction::new(attack_address, Bytes::new()),
        WETH,
        SwapInstruction::new(VENUE_B, ConstantProductVenue::encode_swap(WETH, USDC, U256::from(1), U256::ZERO)),
        U256::ZERO,
    );

    let err = world
        .engine
        .trigger(&world.owner, &world.ledger, USDC, U256::from(10_000), plan.encode())
        .unwrap_err();
    assert!(matches!(err, EngineError::SwapLegFailed { leg: 1, .. }));

    let observed = attack.observed.lock().unwrap().take().expect("attack venue ran");
    assert!(matches!(observed, EngineError::ReentrantCall));

    // The outer unwind left nothing behind.
    assert_eq!(world.ledger.balance_of(USDC, POOL), U256::from(1_000_000u64));
    assert_eq!(world.ledger.balance_of(USDC, ENGINE), U256::ZERO);
}
