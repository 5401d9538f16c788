//! Scenario runner.

use std::collections::BTreeMap;

use serde::Serialize;
use tpo_book::InMemoryShareLedger;
use tpo_core::{AccountId, Amount, AssetId, Direction, PoolKey, Tick};
use tpo_engine::{PlacedOrder, PoolStateReader, TakeProfitEngine};
use tracing::{info, warn};

use crate::config::{amount, SimConfig, Step};
use crate::error::{SimError, SimResult};
use crate::router::{swap, SwapOutcome};
use crate::venue::{SimPool, SimulatedVenue};

/// What one step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum StepOutcome {
    Place(PlacedOrder),
    Cancel { refunded: Amount },
    Redeem { output: Amount },
    Swap(SwapOutcome),
}

/// End-of-run figures, printed by the binary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub steps_ok: usize,
    pub steps_failed: usize,
    pub fills: usize,
    pub self_notices_skipped: usize,
    /// Live tick per pool, keyed by the pool's display form.
    pub final_ticks: BTreeMap<String, i32>,
    pub pending_levels: usize,
    /// Balances per account and asset at the end of the run.
    pub balances: BTreeMap<String, BTreeMap<String, Amount>>,
}

/// Engine plus simulated venue, built from a scenario file.
pub struct Simulation {
    engine: TakeProfitEngine<SimulatedVenue>,
    pools: Vec<PoolKey>,
    accounts: Vec<AccountId>,
    fail_fast: bool,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> SimResult<Self> {
        config.validate().map_err(SimError::Config)?;

        let mut venue = SimulatedVenue::new(config.engine_account());
        let mut pools = Vec::with_capacity(config.pools.len());
        for pool in &config.pools {
            let key = pool.key()?;
            venue.add_pool(SimPool {
                key,
                tick: pool.initial_tick(),
                depth_per_tick: amount(pool.depth_per_tick),
                reserve0: amount(pool.reserve0),
                reserve1: amount(pool.reserve1),
            })?;
            pools.push(key);
        }

        let mut accounts = Vec::with_capacity(config.accounts.len());
        for account in &config.accounts {
            let id = AccountId(account.id);
            for balance in &account.balances {
                venue.fund(id, AssetId(balance.asset), amount(balance.amount))?;
            }
            accounts.push(id);
        }

        let mut engine = TakeProfitEngine::new(
            config.engine.clone(),
            config.engine_account(),
            venue,
            InMemoryShareLedger::new(),
        )?;
        for pool in &pools {
            let tick = engine.venue().current_tick(pool)?;
            engine.initialize_pool(*pool, tick)?;
        }

        info!(
            pools = pools.len(),
            accounts = accounts.len(),
            engine_account = %config.engine_account(),
            "simulation ready"
        );
        Ok(Self {
            engine,
            pools,
            accounts,
            fail_fast: config.fail_fast,
        })
    }

    pub fn engine(&self) -> &TakeProfitEngine<SimulatedVenue> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TakeProfitEngine<SimulatedVenue> {
        &mut self.engine
    }

    pub fn pool(&self, index: usize) -> SimResult<PoolKey> {
        self.pools
            .get(index)
            .copied()
            .ok_or_else(|| SimError::Config(format!("pool index {index} out of range")))
    }

    pub fn tick(&self, index: usize) -> SimResult<Tick> {
        let pool = self.pool(index)?;
        Ok(self.engine.venue().current_tick(&pool)?)
    }

    pub fn run_step(&mut self, step: &Step) -> SimResult<StepOutcome> {
        let pool = self.pool(step.pool_index())?;
        let owner = step.account();
        let outcome = match *step {
            Step::Place {
                tick,
                direction,
                amount: qty,
                ..
            } => StepOutcome::Place(self.engine.place_order(
                owner,
                pool,
                Tick(tick),
                direction,
                amount(qty),
            )?),
            Step::Cancel {
                tick, direction, ..
            } => StepOutcome::Cancel {
                refunded: self.engine.cancel_order(owner, pool, Tick(tick), direction)?,
            },
            Step::Redeem {
                tick,
                direction,
                amount: qty,
                ..
            } => {
                let share = match qty {
                    Some(qty) => amount(qty),
                    None => self.full_share(owner, pool, Tick(tick), direction),
                };
                StepOutcome::Redeem {
                    output: self
                        .engine
                        .redeem_order(owner, pool, Tick(tick), direction, share)?,
                }
            }
            Step::Swap {
                direction,
                amount: qty,
                ..
            } => StepOutcome::Swap(swap(&mut self.engine, pool, owner, direction, amount(qty))?),
        };
        Ok(outcome)
    }

    /// Replay `steps` in order.
    ///
    /// A failing step is logged and counted unless `fail_fast` is set, in
    /// which case its error is returned.
    pub fn run(&mut self, steps: &[Step]) -> SimResult<Summary> {
        let mut summary = Summary::default();
        for (i, step) in steps.iter().enumerate() {
            match self.run_step(step) {
                Ok(outcome) => {
                    summary.steps_ok += 1;
                    if let StepOutcome::Swap(swap) = &outcome {
                        summary.fills += swap.fill_count();
                        summary.self_notices_skipped += swap.own_notices;
                    }
                    info!(step = i, action = step.action(), account = %step.account(), ?outcome, "step completed");
                }
                Err(e) if !self.fail_fast => {
                    summary.steps_failed += 1;
                    warn!(step = i, action = step.action(), account = %step.account(), error = %e, "step failed");
                }
                Err(e) => return Err(e),
            }
        }

        for pool in &self.pools {
            let tick = self.engine.venue().current_tick(pool)?;
            summary.final_ticks.insert(pool.to_string(), tick.0);
            summary.pending_levels += self.engine.book().levels().level_count_for(pool);
        }
        let assets = self.assets();
        let mut holders = self.accounts.clone();
        holders.push(self.engine.identity());
        for account in holders {
            let balances = assets
                .iter()
                .map(|asset| (asset.to_string(), self.engine.venue().balance(account, *asset)))
                .collect();
            summary.balances.insert(account.to_string(), balances);
        }
        Ok(summary)
    }

    fn full_share(&self, owner: AccountId, pool: PoolKey, tick: Tick, direction: Direction) -> Amount {
        self.engine.share_balance(owner, pool, tick, direction)
    }

    fn assets(&self) -> Vec<AssetId> {
        let mut assets: Vec<AssetId> = self
            .pools
            .iter()
            .flat_map(|p| [p.currency0, p.currency1])
            .collect();
        assets.sort();
        assets.dedup();
        assets
    }
}
