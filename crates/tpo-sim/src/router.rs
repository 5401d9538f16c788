//! External swaps and post-trade notification delivery.

use serde::Serialize;
use tpo_book::ClaimShareLedger;
use tpo_core::{AccountId, Amount, Direction, PoolKey};
use tpo_engine::{CrossingReport, TakeProfitEngine, TradeExecutor};
use tracing::debug;

use crate::error::SimResult;
use crate::venue::SimulatedVenue;

/// Result of one routed swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    /// Output the trader received.
    pub output: Amount,
    /// Crossing passes triggered by the swap.
    pub reports: Vec<CrossingReport>,
    /// Notices the engine ignored because it initiated the trade.
    pub own_notices: usize,
}

impl SwapOutcome {
    pub fn fill_count(&self) -> usize {
        self.reports.iter().map(|r| r.fills.len()).sum()
    }
}

/// Execute an external trade, then hand every queued notice to the engine.
///
/// Engine fills queue notices of their own while the pass runs; they are
/// delivered too and must come back as no-ops.
pub fn swap<S: ClaimShareLedger>(
    engine: &mut TakeProfitEngine<SimulatedVenue, S>,
    pool: PoolKey,
    trader: AccountId,
    direction: Direction,
    amount: Amount,
) -> SimResult<SwapOutcome> {
    let output = engine.venue_mut().trade(&pool, trader, direction, amount)?;
    debug!(%pool, %trader, %direction, amount, output, "external swap");

    let mut outcome = SwapOutcome {
        output,
        reports: Vec::new(),
        own_notices: 0,
    };
    deliver_notices(engine, &mut outcome)?;
    Ok(outcome)
}

fn deliver_notices<S: ClaimShareLedger>(
    engine: &mut TakeProfitEngine<SimulatedVenue, S>,
    outcome: &mut SwapOutcome,
) -> SimResult<()> {
    while let Some(notice) = engine.venue_mut().pop_notice() {
        let result = engine.after_trade(notice.pool, notice.initiator, notice.direction);
        match result {
            Ok(Some(report)) => outcome.reports.push(report),
            Ok(None) => outcome.own_notices += 1,
            Err(e) => {
                // Drop what the aborted pass queued; those trades were the
                // engine's own.
                while engine.venue_mut().pop_notice().is_some() {}
                return Err(e.into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpo_book::InMemoryShareLedger;
    use tpo_core::{AssetId, Tick, TickSpacing};
    use tpo_engine::EngineConfig;

    use crate::venue::SimPool;

    const ENGINE: AccountId = AccountId(0);
    const ALICE: AccountId = AccountId(1);
    const BOB: AccountId = AccountId(2);

    fn pool() -> PoolKey {
        PoolKey::new(AssetId(0), AssetId(1), 30, TickSpacing::new(10).unwrap()).unwrap()
    }

    fn engine_at(tick: i32) -> TakeProfitEngine<SimulatedVenue> {
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
        for account in [ALICE, BOB] {
            venue.fund(account, AssetId(0), 10_000_000).unwrap();
            venue.fund(account, AssetId(1), 10_000_000).unwrap();
        }
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

    #[test]
    fn test_swap_without_orders_reports_empty_pass() {
        let mut engine = engine_at(0);
        let outcome = swap(&mut engine, pool(), BOB, Direction::OneForZero, 50_000).unwrap();

        assert!(outcome.output > 0);
        assert_eq!(outcome.reports.len(), 1);
        assert!(outcome.reports[0].fills.is_empty());
        assert_eq!(outcome.own_notices, 0);
        assert_eq!(engine.watermark(&pool()), Some(Tick(50)));
    }

    #[test]
    fn test_engine_fill_notice_is_skipped() {
        let mut engine = engine_at(500);
        engine
            .place_order(ALICE, pool(), Tick(600), Direction::ZeroForOne, 100)
            .unwrap();

        let outcome = swap(&mut engine, pool(), BOB, Direction::OneForZero, 200_000).unwrap();
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.fill_count(), 1);
        assert_eq!(outcome.own_notices, 1);
        assert_eq!(engine.venue().pending_notices(), 0);
        assert_eq!(engine.venue().trade_count(), 2);
    }

    #[test]
    fn test_failed_swap_notifies_nothing() {
        let mut engine = engine_at(0);
        let err = swap(&mut engine, pool(), BOB, Direction::OneForZero, 1_000_000_000).unwrap_err();
        assert!(matches!(err, crate::SimError::Venue(_)));
        assert_eq!(engine.watermark(&pool()), Some(Tick(0)));
        assert_eq!(engine.venue().pending_notices(), 0);
    }
}
