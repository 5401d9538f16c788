//! In-memory AMM venue.
//!
//! Each pool keeps a tick and a linear depth: a trade of `amount` moves the
//! tick by `amount / depth_per_tick`, down for zero-for-one and up for
//! one-for-zero. Trades are priced at `1.0001^tick` taken at the midpoint of
//! the move, less the pool fee. Every settled trade queues a `TradeNotice`
//! so the caller can notify the engine after the swap completes.

use std::collections::{HashMap, VecDeque};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tpo_core::{AccountId, Amount, AssetId, Direction, PoolKey, Tick, MAX_TICK, MIN_TICK};
use tpo_engine::{AssetTransfer, PoolStateReader, TradeExecutor, VenueError, VenueResult};
use tracing::{debug, trace};

const BPS_DENOMINATOR: u32 = 10_000;

/// One simulated pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimPool {
    pub key: PoolKey,
    pub tick: Tick,
    /// Input units needed to move the tick by one.
    pub depth_per_tick: Amount,
    pub reserve0: Amount,
    pub reserve1: Amount,
}

impl SimPool {
    /// Output and resulting tick of an exact-input trade, without settling it.
    pub fn quote(&self, direction: Direction, amount: Amount) -> VenueResult<(Amount, Tick)> {
        let moved = i64::try_from(amount / self.depth_per_tick.max(1)).unwrap_or(i64::MAX);
        let start = i64::from(self.tick.0);
        let end = match direction {
            Direction::ZeroForOne => start.saturating_sub(moved),
            Direction::OneForZero => start.saturating_add(moved),
        }
        .clamp(i64::from(MIN_TICK), i64::from(MAX_TICK));
        let mid = (start + end) / 2;

        let price = Decimal::new(10_001, 4)
            .checked_powi(mid)
            .ok_or_else(|| VenueError::Overflow(format!("price at tick {mid}")))?;
        let fee = Decimal::from(self.key.fee_bps) / Decimal::from(BPS_DENOMINATOR);
        let gross = Decimal::from_u128(amount)
            .ok_or_else(|| VenueError::Overflow(format!("trade amount {amount}")))?;
        let net = gross
            .checked_mul(Decimal::ONE - fee)
            .ok_or_else(|| VenueError::Overflow("fee adjustment".to_string()))?;

        let output = match direction {
            Direction::ZeroForOne => net.checked_mul(price),
            Direction::OneForZero => net.checked_div(price),
        }
        .ok_or_else(|| VenueError::Overflow(format!("output at tick {mid}")))?;
        let output = output
            .floor()
            .to_u128()
            .ok_or_else(|| VenueError::Overflow(format!("output {output}")))?;

        // `end` was clamped into the tick range above.
        Ok((output, Tick(end as i32)))
    }

    fn reserve_mut(&mut self, asset: AssetId) -> &mut Amount {
        if asset == self.key.currency0 {
            &mut self.reserve0
        } else {
            &mut self.reserve1
        }
    }
}

/// Post-trade notification, delivered once per completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeNotice {
    pub pool: PoolKey,
    pub initiator: AccountId,
    pub direction: Direction,
}

/// Balances, pools and the pending notice queue.
///
/// `custodian` is the account whose balance holds assets transferred in by
/// order owners; it is the identity the engine trades under.
#[derive(Debug, Clone)]
pub struct SimulatedVenue {
    custodian: AccountId,
    pools: HashMap<PoolKey, SimPool>,
    balances: HashMap<(AccountId, AssetId), Amount>,
    notices: VecDeque<TradeNotice>,
    trade_count: u64,
}

impl SimulatedVenue {
    pub fn new(custodian: AccountId) -> Self {
        Self {
            custodian,
            pools: HashMap::new(),
            balances: HashMap::new(),
            notices: VecDeque::new(),
            trade_count: 0,
        }
    }

    pub fn custodian(&self) -> AccountId {
        self.custodian
    }

    pub fn add_pool(&mut self, pool: SimPool) -> VenueResult<()> {
        if pool.depth_per_tick == 0 {
            return Err(VenueError::TradeRejected {
                pool: pool.key,
                reason: "depth_per_tick must be positive".to_string(),
            });
        }
        debug!(pool = %pool.key, tick = %pool.tick, "pool added");
        self.pools.insert(pool.key, pool);
        Ok(())
    }

    pub fn pool(&self, key: &PoolKey) -> Option<&SimPool> {
        self.pools.get(key)
    }

    /// Move the tick directly, without a trade or a notice.
    pub fn set_tick(&mut self, key: &PoolKey, tick: Tick) -> VenueResult<()> {
        let pool = self.pools.get_mut(key).ok_or(VenueError::UnknownPool(*key))?;
        pool.tick = tick;
        Ok(())
    }

    pub fn fund(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> VenueResult<()> {
        self.credit(account, asset, amount)
    }

    pub fn balance(&self, account: AccountId, asset: AssetId) -> Amount {
        self.balances.get(&(account, asset)).copied().unwrap_or(0)
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    pub fn pending_notices(&self) -> usize {
        self.notices.len()
    }

    pub fn pop_notice(&mut self) -> Option<TradeNotice> {
        self.notices.pop_front()
    }

    fn credit(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> VenueResult<()> {
        let balance = self.balances.entry((account, asset)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| VenueError::Overflow(format!("{account} balance of {asset}")))?;
        Ok(())
    }

    fn debit(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> VenueResult<()> {
        let balance = self.balance(account, asset);
        if balance < amount {
            return Err(VenueError::InsufficientBalance {
                account,
                asset,
                balance,
                requested: amount,
            });
        }
        self.balances.insert((account, asset), balance - amount);
        Ok(())
    }
}

impl PoolStateReader for SimulatedVenue {
    fn current_tick(&self, pool: &PoolKey) -> VenueResult<Tick> {
        self.pools
            .get(pool)
            .map(|p| p.tick)
            .ok_or(VenueError::UnknownPool(*pool))
    }
}

impl TradeExecutor for SimulatedVenue {
    fn trade(
        &mut self,
        pool: &PoolKey,
        trader: AccountId,
        direction: Direction,
        amount: Amount,
    ) -> VenueResult<Amount> {
        if amount == 0 {
            return Err(VenueError::TradeRejected {
                pool: *pool,
                reason: "zero input".to_string(),
            });
        }
        let state = self.pools.get(pool).ok_or(VenueError::UnknownPool(*pool))?;
        let (output, new_tick) = state.quote(direction, amount)?;

        let input_asset = pool.input_asset(direction);
        let output_asset = pool.output_asset(direction);
        let available = match direction {
            Direction::ZeroForOne => state.reserve1,
            Direction::OneForZero => state.reserve0,
        };
        if output > available {
            return Err(VenueError::InsufficientLiquidity {
                pool: *pool,
                requested: output,
                available,
            });
        }
        let balance = self.balance(trader, input_asset);
        if balance < amount {
            return Err(VenueError::InsufficientBalance {
                account: trader,
                asset: input_asset,
                balance,
                requested: amount,
            });
        }
        let reserve_in = match direction {
            Direction::ZeroForOne => state.reserve0,
            Direction::OneForZero => state.reserve1,
        };
        let reserve_in = reserve_in
            .checked_add(amount)
            .ok_or_else(|| VenueError::Overflow(format!("{pool} reserve of {input_asset}")))?;
        let trader_out = self
            .balance(trader, output_asset)
            .checked_add(output)
            .ok_or_else(|| VenueError::Overflow(format!("{trader} balance of {output_asset}")))?;

        // All checks passed: settle.
        self.balances.insert((trader, input_asset), balance - amount);
        self.balances.insert((trader, output_asset), trader_out);
        if let Some(state) = self.pools.get_mut(pool) {
            *state.reserve_mut(input_asset) = reserve_in;
            *state.reserve_mut(output_asset) = available - output;
            state.tick = new_tick;
        }
        self.trade_count += 1;
        self.notices.push_back(TradeNotice {
            pool: *pool,
            initiator: trader,
            direction,
        });
        trace!(%pool, %trader, %direction, amount, output, tick = %new_tick, "trade settled");
        Ok(output)
    }
}

impl AssetTransfer for SimulatedVenue {
    fn transfer_in(&mut self, asset: AssetId, from: AccountId, amount: Amount) -> VenueResult<()> {
        self.debit(from, asset, amount)?;
        self.credit(self.custodian, asset, amount)
    }

    fn transfer_out(&mut self, asset: AssetId, to: AccountId, amount: Amount) -> VenueResult<()> {
        self.debit(self.custodian, asset, amount)?;
        self.credit(to, asset, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tpo_core::TickSpacing;

    const CUSTODIAN: AccountId = AccountId(0);
    const TRADER: AccountId = AccountId(7);

    fn key(fee_bps: u32) -> PoolKey {
        PoolKey::new(AssetId(0), AssetId(1), fee_bps, TickSpacing::new(10).unwrap()).unwrap()
    }

    fn sim_pool(fee_bps: u32, tick: i32) -> SimPool {
        SimPool {
            key: key(fee_bps),
            tick: Tick(tick),
            depth_per_tick: 1_000,
            reserve0: 1_000_000_000,
            reserve1: 1_000_000_000,
        }
    }

    fn venue_with(pool: SimPool) -> SimulatedVenue {
        let mut venue = SimulatedVenue::new(CUSTODIAN);
        venue.add_pool(pool).unwrap();
        venue
    }

    #[test]
    fn test_quote_at_tick_zero_is_par_less_fee() {
        let pool = sim_pool(0, 0);
        assert_eq!(pool.quote(Direction::ZeroForOne, 500).unwrap(), (500, Tick(0)));

        let pool = sim_pool(30, 0);
        // 10_000 * 0.997 = 9_970, tick moves 10 down, mid tick -5.
        let (output, tick) = pool.quote(Direction::ZeroForOne, 10_000).unwrap();
        assert_eq!(tick, Tick(-10));
        let expected = (dec!(9970) * dec!(1.0001).powi(-5)).floor();
        assert_eq!(Some(output), expected.to_u128());
    }

    #[test]
    fn test_quote_direction_moves_tick() {
        let pool = sim_pool(0, 100);
        assert_eq!(pool.quote(Direction::OneForZero, 50_000).unwrap().1, Tick(150));
        assert_eq!(pool.quote(Direction::ZeroForOne, 50_000).unwrap().1, Tick(50));
    }

    #[test]
    fn test_quote_small_input_keeps_tick() {
        let pool = sim_pool(30, -200);
        let (output, tick) = pool.quote(Direction::OneForZero, 999).unwrap();
        assert_eq!(tick, Tick(-200));
        // Token1 is worth less than token0 below tick zero.
        assert!(output > 999 * 997 / 1000);
    }

    #[test]
    fn test_trade_settles_and_queues_notice() {
        let mut venue = venue_with(sim_pool(30, 0));
        venue.fund(TRADER, AssetId(1), 100_000).unwrap();

        let output = venue
            .trade(&key(30), TRADER, Direction::OneForZero, 20_000)
            .unwrap();
        assert!(output > 0);
        assert_eq!(venue.balance(TRADER, AssetId(1)), 80_000);
        assert_eq!(venue.balance(TRADER, AssetId(0)), output);
        assert_eq!(venue.current_tick(&key(30)).unwrap(), Tick(20));

        let pool = venue.pool(&key(30)).unwrap();
        assert_eq!(pool.reserve1, 1_000_020_000);
        assert_eq!(pool.reserve0, 1_000_000_000 - output);

        assert_eq!(venue.pending_notices(), 1);
        let notice = venue.pop_notice().unwrap();
        assert_eq!(notice.initiator, TRADER);
        assert_eq!(notice.direction, Direction::OneForZero);
        assert!(venue.pop_notice().is_none());
    }

    #[test]
    fn test_failed_trade_leaves_no_trace() {
        let mut venue = venue_with(sim_pool(30, 0));
        venue.fund(TRADER, AssetId(1), 10).unwrap();

        let err = venue
            .trade(&key(30), TRADER, Direction::OneForZero, 20_000)
            .unwrap_err();
        assert!(matches!(err, VenueError::InsufficientBalance { .. }));
        assert_eq!(venue.balance(TRADER, AssetId(1)), 10);
        assert_eq!(venue.current_tick(&key(30)).unwrap(), Tick(0));
        assert_eq!(venue.pending_notices(), 0);
        assert_eq!(venue.trade_count(), 0);
    }

    #[test]
    fn test_trade_rejects_zero_and_unknown_pool() {
        let mut venue = venue_with(sim_pool(30, 0));
        assert!(matches!(
            venue.trade(&key(30), TRADER, Direction::ZeroForOne, 0),
            Err(VenueError::TradeRejected { .. })
        ));
        assert!(matches!(
            venue.trade(&key(5), TRADER, Direction::ZeroForOne, 10),
            Err(VenueError::UnknownPool(_))
        ));
    }

    #[test]
    fn test_trade_respects_reserves() {
        let mut pool = sim_pool(0, 0);
        pool.reserve0 = 100;
        let mut venue = venue_with(pool);
        venue.fund(TRADER, AssetId(1), 1_000).unwrap();

        assert!(matches!(
            venue.trade(&key(0), TRADER, Direction::OneForZero, 1_000),
            Err(VenueError::InsufficientLiquidity { requested: 1_000, available: 100, .. })
        ));
    }

    #[test]
    fn test_transfers_move_through_custodian() {
        let mut venue = venue_with(sim_pool(30, 0));
        venue.fund(TRADER, AssetId(0), 500).unwrap();

        venue.transfer_in(AssetId(0), TRADER, 200).unwrap();
        assert_eq!(venue.balance(TRADER, AssetId(0)), 300);
        assert_eq!(venue.balance(CUSTODIAN, AssetId(0)), 200);

        venue.transfer_out(AssetId(0), TRADER, 50).unwrap();
        assert_eq!(venue.balance(CUSTODIAN, AssetId(0)), 150);

        assert!(matches!(
            venue.transfer_out(AssetId(0), TRADER, 1_000),
            Err(VenueError::InsufficientBalance { .. })
        ));
        assert!(matches!(
            venue.transfer_in(AssetId(0), TRADER, 1_000),
            Err(VenueError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_add_pool_rejects_zero_depth() {
        let mut pool = sim_pool(30, 0);
        pool.depth_per_tick = 0;
        assert!(SimulatedVenue::new(CUSTODIAN).add_pool(pool).is_err());
    }
}
