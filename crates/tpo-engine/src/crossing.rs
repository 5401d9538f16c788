//! Tick-crossing detection and execution.
//!
//! There is no "order triggered" signal upstream. After each external
//! trade the engine compares the pool's live tick with its watermark and
//! walks the quantized levels in between:
//!
//! - tick moved up: levels in `[watermark, current]`, ascending
//! - tick moved down (or not at all): levels in `(current, watermark]`,
//!   descending
//!
//! The first level holding a pending amount in the direction opposite to
//! the external trade is executed. Executing it is itself a trade and may
//! move the tick back, so the live tick is re-read and the window rebuilt
//! after every fill. The pass ends when a window holds no eligible level;
//! only then does the watermark advance to the live tick.

use serde::{Deserialize, Serialize};
use tpo_book::{ClaimShareLedger, PriceLevelIndex};
use tpo_core::{AccountId, Amount, Direction, LevelKey, PoolKey, Tick, TickSpacing};
use tpo_telemetry::Metrics;
use tracing::{debug, error, info, trace, warn};

use crate::engine::{PoolPhase, TakeProfitEngine};
use crate::error::{EngineError, EngineResult};
use crate::venue::Venue;

/// Tick interval between the watermark and the live tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanWindow {
    /// Levels `L` with `from <= L <= to`, walked upward.
    Ascending { from: Tick, to: Tick },
    /// Levels `L` with `to < L <= from`, walked downward.
    Descending { from: Tick, to: Tick },
}

impl ScanWindow {
    /// Window from the last observed tick to the current one.
    ///
    /// An unchanged tick yields an empty descending window.
    pub fn between(last: Tick, current: Tick) -> Self {
        if current > last {
            Self::Ascending {
                from: last,
                to: current,
            }
        } else {
            Self::Descending {
                from: last,
                to: current,
            }
        }
    }

    pub fn contains(&self, tick: Tick) -> bool {
        match *self {
            Self::Ascending { from, to } => from <= tick && tick <= to,
            Self::Descending { from, to } => to < tick && tick <= from,
        }
    }

    /// Quantized levels inside the window, nearest to the watermark first.
    pub fn levels(&self, spacing: TickSpacing) -> ScanLevels {
        let next = match *self {
            Self::Ascending { from, .. } => from.quantize_up(spacing),
            Self::Descending { from, .. } => from.quantize(spacing),
        };
        ScanLevels {
            window: *self,
            spacing,
            next,
        }
    }
}

/// Iterator over the levels of a [`ScanWindow`].
#[derive(Debug, Clone)]
pub struct ScanLevels {
    window: ScanWindow,
    spacing: TickSpacing,
    next: Option<Tick>,
}

impl Iterator for ScanLevels {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        let tick = self.next.filter(|t| self.window.contains(*t))?;
        self.next = match self.window {
            ScanWindow::Ascending { .. } => tick.checked_step_up(self.spacing),
            ScanWindow::Descending { .. } => tick.checked_step_down(self.spacing),
        };
        Some(tick)
    }
}

/// A level found eligible for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleLevel {
    pub level: LevelKey,
    pub amount: Amount,
}

/// Outcome of scanning one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub window: ScanWindow,
    /// Nearest level to the watermark with a pending amount.
    pub eligible: Option<EligibleLevel>,
    pub levels_scanned: u64,
    pub last_scanned: Option<Tick>,
    /// The scan stopped at `max_levels` with levels left in the window.
    pub truncated: bool,
}

/// Find the first executable level between two observed ticks.
///
/// Pure: reads `levels` only, so it can be driven with any pair of ticks
/// and any pending-order table.
pub fn detect_crossing(
    levels: &PriceLevelIndex,
    pool: PoolKey,
    last: Tick,
    current: Tick,
    direction: Direction,
    max_levels: u64,
) -> Detection {
    let window = ScanWindow::between(last, current);
    let mut detection = Detection {
        window,
        eligible: None,
        levels_scanned: 0,
        last_scanned: None,
        truncated: false,
    };

    for tick in window.levels(pool.tick_spacing) {
        if detection.levels_scanned == max_levels {
            detection.truncated = true;
            break;
        }
        detection.levels_scanned += 1;
        detection.last_scanned = Some(tick);

        let level = LevelKey::new(pool, tick, direction);
        let amount = levels.peek_level(&level);
        if amount > 0 {
            detection.eligible = Some(EligibleLevel { level, amount });
            break;
        }
    }
    detection
}

/// One executed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRecord {
    pub level: LevelKey,
    /// Sell-side amount traded into the pool.
    pub input: Amount,
    /// Output realised by that trade, credited to the order's claims.
    pub output: Amount,
}

/// Summary of one crossing-detection invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingReport {
    pub pool: PoolKey,
    /// Direction the resting orders were executed in.
    pub direction: Direction,
    pub fills: Vec<FillRecord>,
    /// Live tick at the end of the pass.
    pub final_tick: Tick,
    pub levels_scanned: u64,
    /// A safety cap stopped the pass before the window was exhausted.
    pub capped: bool,
}

impl CrossingReport {
    fn new(pool: PoolKey, direction: Direction, start_tick: Tick) -> Self {
        Self {
            pool,
            direction,
            fills: Vec::new(),
            final_tick: start_tick,
            levels_scanned: 0,
            capped: false,
        }
    }

    pub fn total_input(&self) -> Amount {
        self.fills.iter().map(|f| f.input).sum()
    }

    pub fn total_output(&self) -> Amount {
        self.fills.iter().map(|f| f.output).sum()
    }
}

impl<V: Venue, S: ClaimShareLedger> TakeProfitEngine<V, S> {
    /// Crossing-detection entry point, called once per completed trade on
    /// `pool`.
    ///
    /// Returns `None` without scanning when `initiator` is the engine
    /// itself: its own executions must never start a nested pass.
    /// A failed execution aborts the rest of the pass; fills completed
    /// before it stay committed and the watermark is left unchanged.
    pub fn after_trade(
        &mut self,
        pool: PoolKey,
        initiator: AccountId,
        trade_direction: Direction,
    ) -> EngineResult<Option<CrossingReport>> {
        let label = pool.to_string();
        if initiator == self.identity {
            trace!(%pool, "own trade, crossing detection skipped");
            Metrics::self_trade_skipped(&label);
            return Ok(None);
        }

        let state = self.pool_state_mut(&pool)?;
        state.phase = PoolPhase::Scanning;
        let start_tick = state.watermark;

        let mut report = CrossingReport::new(pool, trade_direction.opposite(), start_tick);
        let result = self.run_crossing_pass(&mut report);

        if let Some(state) = self.pools.get_mut(&pool) {
            state.phase = PoolPhase::Idle;
        }
        Metrics::pending_levels(&label, self.book.levels().level_count_for(&pool));

        match result {
            Ok(()) => {
                let outcome = if report.capped { "capped" } else { "completed" };
                Metrics::crossing_pass(&label, outcome, report.levels_scanned);
                debug!(
                    %pool,
                    fills = report.fills.len(),
                    final_tick = %report.final_tick,
                    levels_scanned = report.levels_scanned,
                    capped = report.capped,
                    "crossing pass finished"
                );
                Ok(Some(report))
            }
            Err(e) => {
                Metrics::crossing_pass(&label, "failed", report.levels_scanned);
                error!(%pool, fills_committed = report.fills.len(), error = %e, "crossing pass aborted");
                Err(e)
            }
        }
    }

    fn run_crossing_pass(&mut self, report: &mut CrossingReport) -> EngineResult<()> {
        let pool = report.pool;
        let max_fills = usize::try_from(self.config.max_fills_per_pass).unwrap_or(usize::MAX);

        loop {
            let current = self.venue.current_tick(&pool)?;
            let last = self.pool_state(&pool)?.watermark;
            report.final_tick = current;

            let detection = detect_crossing(
                self.book.levels(),
                pool,
                last,
                current,
                report.direction,
                self.config.max_levels_per_scan,
            );
            report.levels_scanned += detection.levels_scanned;

            if let Some(eligible) = detection.eligible {
                if report.fills.len() >= max_fills {
                    warn!(%pool, max_fills, level = %eligible.level, "fill cap reached, deferring remaining levels");
                    report.capped = true;
                    return Ok(());
                }
                let fill = self.execute(eligible.level, eligible.amount)?;
                report.fills.push(fill);
                continue;
            }

            let state = self.pool_state_mut(&pool)?;
            if detection.truncated {
                if let Some(tick) = detection.last_scanned {
                    state.watermark = tick;
                }
                warn!(%pool, watermark = %state.watermark, %current, "scan cap reached, window partially walked");
                report.capped = true;
            } else {
                state.watermark = current;
            }
            return Ok(());
        }
    }

    /// Trade a level's whole pending amount into the pool and credit the
    /// realised output to its claims.
    fn execute(&mut self, level: LevelKey, amount: Amount) -> EngineResult<FillRecord> {
        let output = self
            .venue
            .trade(&level.pool, self.identity, level.direction, amount)
            .map_err(|source| EngineError::TradeExecutionFailed { level, source })?;
        self.book.fill(level, amount, output)?;

        Metrics::fill_executed(&level.pool.to_string(), &level.direction.to_string());
        info!(%level, input = amount, output, "resting level executed");
        Ok(FillRecord {
            level,
            input: amount,
            output,
        })
    }
}
