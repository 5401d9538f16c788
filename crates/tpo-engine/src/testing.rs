//! Scripted venue for engine unit tests.

use std::collections::{HashMap, VecDeque};

use tpo_book::InMemoryShareLedger;
use tpo_core::{AccountId, Amount, AssetId, Direction, PoolKey, Tick, TickSpacing};

use crate::config::EngineConfig;
use crate::engine::TakeProfitEngine;
use crate::error::{VenueError, VenueResult};
use crate::venue::{AssetTransfer, PoolStateReader, TradeExecutor};

pub const ENGINE: AccountId = AccountId(0);
pub const ALICE: AccountId = AccountId(1);
pub const BOB: AccountId = AccountId(2);
pub const TRADER: AccountId = AccountId(9);

pub fn pool() -> PoolKey {
    PoolKey::new(AssetId(0), AssetId(1), 30, TickSpacing::new(10).unwrap()).unwrap()
}

/// Venue whose tick only moves when a test says so.
///
/// Engine trades pay `amount * output_num / output_den` and then jump the
/// tick to the next scripted value (if any).
pub struct ScriptedVenue {
    pub ticks: HashMap<PoolKey, Tick>,
    pub balances: HashMap<(AccountId, AssetId), Amount>,
    pub custody: HashMap<AssetId, Amount>,
    pub trades: Vec<(PoolKey, AccountId, Direction, Amount)>,
    pub ticks_after_trade: VecDeque<Tick>,
    pub output_num: Amount,
    pub output_den: Amount,
    /// Reject the n-th trade (0-based).
    pub fail_trade_at: Option<usize>,
    pub fail_transfers_out: bool,
}

impl ScriptedVenue {
    pub fn new() -> Self {
        Self {
            ticks: HashMap::new(),
            balances: HashMap::new(),
            custody: HashMap::new(),
            trades: Vec::new(),
            ticks_after_trade: VecDeque::new(),
            output_num: 2,
            output_den: 1,
            fail_trade_at: None,
            fail_transfers_out: false,
        }
    }

    pub fn set_tick(&mut self, pool: PoolKey, tick: Tick) {
        self.ticks.insert(pool, tick);
    }

    pub fn fund(&mut self, account: AccountId, asset: AssetId, amount: Amount) {
        *self.balances.entry((account, asset)).or_default() += amount;
    }

    pub fn balance(&self, account: AccountId, asset: AssetId) -> Amount {
        self.balances.get(&(account, asset)).copied().unwrap_or(0)
    }

    pub fn custody_of(&self, asset: AssetId) -> Amount {
        self.custody.get(&asset).copied().unwrap_or(0)
    }
}

impl PoolStateReader for ScriptedVenue {
    fn current_tick(&self, pool: &PoolKey) -> VenueResult<Tick> {
        self.ticks
            .get(pool)
            .copied()
            .ok_or(VenueError::UnknownPool(*pool))
    }
}

impl TradeExecutor for ScriptedVenue {
    fn trade(
        &mut self,
        pool: &PoolKey,
        trader: AccountId,
        direction: Direction,
        amount: Amount,
    ) -> VenueResult<Amount> {
        if self.fail_trade_at == Some(self.trades.len()) {
            return Err(VenueError::TradeRejected {
                pool: *pool,
                reason: "scripted failure".to_string(),
            });
        }
        let input = pool.input_asset(direction);
        let output_asset = pool.output_asset(direction);
        let held = self.custody_of(input);
        if held < amount {
            return Err(VenueError::InsufficientBalance {
                account: trader,
                asset: input,
                balance: held,
                requested: amount,
            });
        }
        let output = amount * self.output_num / self.output_den;
        *self.custody.entry(input).or_default() -= amount;
        *self.custody.entry(output_asset).or_default() += output;
        self.trades.push((*pool, trader, direction, amount));
        if let Some(next) = self.ticks_after_trade.pop_front() {
            self.ticks.insert(*pool, next);
        }
        Ok(output)
    }
}

impl AssetTransfer for ScriptedVenue {
    fn transfer_in(&mut self, asset: AssetId, from: AccountId, amount: Amount) -> VenueResult<()> {
        let balance = self.balance(from, asset);
        if balance < amount {
            return Err(VenueError::InsufficientBalance {
                account: from,
                asset,
                balance,
                requested: amount,
            });
        }
        self.balances.insert((from, asset), balance - amount);
        *self.custody.entry(asset).or_default() += amount;
        Ok(())
    }

    fn transfer_out(&mut self, asset: AssetId, to: AccountId, amount: Amount) -> VenueResult<()> {
        let held = self.custody_of(asset);
        if self.fail_transfers_out || held < amount {
            return Err(VenueError::InsufficientBalance {
                account: ENGINE,
                asset,
                balance: held,
                requested: amount,
            });
        }
        *self.custody.entry(asset).or_default() -= amount;
        self.fund(to, asset, amount);
        Ok(())
    }
}

/// Engine over a scripted venue with `pool()` initialised at `tick`.
pub fn engine_at(tick: i32) -> TakeProfitEngine<ScriptedVenue> {
    let mut venue = ScriptedVenue::new();
    venue.set_tick(pool(), Tick(tick));
    venue.fund(ALICE, AssetId(0), 1_000_000);
    venue.fund(ALICE, AssetId(1), 1_000_000);
    venue.fund(BOB, AssetId(0), 1_000_000);
    venue.fund(BOB, AssetId(1), 1_000_000);
    let mut engine = TakeProfitEngine::new(
        EngineConfig::default(),
        ENGINE,
        venue,
        InMemoryShareLedger::new(),
    )
    .unwrap();
    engine.initialize_pool(pool(), Tick(tick)).unwrap();
    engine
}
