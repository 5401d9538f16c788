//! Shared fixtures for simulator integration tests.

use tpo_book::InMemoryShareLedger;
use tpo_core::{AccountId, AssetId, PoolKey, Tick, TickSpacing};
use tpo_engine::{EngineConfig, TakeProfitEngine};
use tpo_sim::{SimPool, SimulatedVenue};

pub const ENGINE: AccountId = AccountId(0);
pub const ALICE: AccountId = AccountId(1);
pub const BOB: AccountId = AccountId(2);
pub const CAROL: AccountId = AccountId(3);

pub const TOKEN0: AssetId = AssetId(0);
pub const TOKEN1: AssetId = AssetId(1);

pub const FUNDING: u128 = 10_000_000;

/// 30 bps pool with spacing 10 and 1_000 units of depth per tick.
pub fn pool() -> PoolKey {
    PoolKey::new(TOKEN0, TOKEN1, 30, TickSpacing::new(10).unwrap()).unwrap()
}

pub fn engine_with(config: EngineConfig, tick: i32) -> TakeProfitEngine<SimulatedVenue> {
    let mut venue = SimulatedVenue::new(ENGINE);
    venue
        .add_pool(SimPool {
            key: pool(),
            tick: Tick(tick),
            depth_per_tick: 1_000,
            reserve0: 1_000_000_000_000,
            reserve1: 1_000_000_000_000,
        })
        .unwrap();
    for account in [ALICE, BOB, CAROL] {
        venue.fund(account, TOKEN0, FUNDING).unwrap();
        venue.fund(account, TOKEN1, FUNDING).unwrap();
    }
    let mut engine =
        TakeProfitEngine::new(config, ENGINE, venue, InMemoryShareLedger::new()).unwrap();
    engine.initialize_pool(pool(), Tick(tick)).unwrap();
    engine
}

pub fn engine_at(tick: i32) -> TakeProfitEngine<SimulatedVenue> {
    engine_with(EngineConfig::default(), tick)
}
