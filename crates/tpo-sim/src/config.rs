//! Scenario configuration.

use serde::{Deserialize, Serialize};
use tpo_core::{AccountId, Amount, AssetId, Direction, PoolKey, Tick, TickSpacing};
use tpo_engine::EngineConfig;

use crate::error::{SimError, SimResult};

/// Simulated pool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub currency0: u32,
    pub currency1: u32,
    /// Swap fee in basis points.
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,
    pub tick_spacing: TickSpacing,
    #[serde(default)]
    pub initial_tick: i32,
    /// Input units that move the tick by one.
    #[serde(default = "default_depth_per_tick")]
    pub depth_per_tick: u64,
    #[serde(default = "default_reserve")]
    pub reserve0: u64,
    #[serde(default = "default_reserve")]
    pub reserve1: u64,
}

fn default_fee_bps() -> u32 {
    30
}

fn default_depth_per_tick() -> u64 {
    1_000
}

fn default_reserve() -> u64 {
    1_000_000_000_000
}

impl PoolConfig {
    pub fn key(&self) -> SimResult<PoolKey> {
        Ok(PoolKey::new(
            AssetId(self.currency0),
            AssetId(self.currency1),
            self.fee_bps,
            self.tick_spacing,
        )?)
    }

    pub fn initial_tick(&self) -> Tick {
        Tick(self.initial_tick)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub asset: u32,
    pub amount: u64,
}

/// Participant account and its starting balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub id: u64,
    #[serde(default)]
    pub balances: Vec<BalanceConfig>,
}

/// One scenario action. `pool` indexes into `[[pools]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Place {
        account: u64,
        pool: usize,
        tick: i32,
        direction: Direction,
        amount: u64,
    },
    /// Cancel the account's whole share.
    Cancel {
        account: u64,
        pool: usize,
        tick: i32,
        direction: Direction,
    },
    /// Redeem `amount` shares, or the whole balance when omitted.
    Redeem {
        account: u64,
        pool: usize,
        tick: i32,
        direction: Direction,
        #[serde(default)]
        amount: Option<u64>,
    },
    /// External trade routed through the pool.
    Swap {
        account: u64,
        pool: usize,
        direction: Direction,
        amount: u64,
    },
}

impl Step {
    pub fn account(&self) -> AccountId {
        let id = match self {
            Self::Place { account, .. }
            | Self::Cancel { account, .. }
            | Self::Redeem { account, .. }
            | Self::Swap { account, .. } => *account,
        };
        AccountId(id)
    }

    pub fn pool_index(&self) -> usize {
        match self {
            Self::Place { pool, .. }
            | Self::Cancel { pool, .. }
            | Self::Redeem { pool, .. }
            | Self::Swap { pool, .. } => *pool,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Place { .. } => "place",
            Self::Cancel { .. } => "cancel",
            Self::Redeem { .. } => "redeem",
            Self::Swap { .. } => "swap",
        }
    }
}

/// Top-level scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Identity the engine trades under and custodian of deposits.
    #[serde(default)]
    pub engine_account: u64,
    /// Stop at the first failing step instead of logging and continuing.
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub engine: EngineConfig,
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("Failed to read scenario: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> SimResult<Self> {
        toml::from_str(content)
            .map_err(|e| SimError::Config(format!("Failed to parse scenario: {e}")))
    }

    pub fn engine_account(&self) -> AccountId {
        AccountId(self.engine_account)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        self.engine.validate()?;

        if self.pools.is_empty() {
            return Err("at least one [[pools]] entry is required".to_string());
        }
        let mut keys = Vec::with_capacity(self.pools.len());
        for (i, pool) in self.pools.iter().enumerate() {
            let key = pool.key().map_err(|e| format!("pools[{i}]: {e}"))?;
            if keys.contains(&key) {
                return Err(format!("pools[{i}]: duplicate pool {key}"));
            }
            keys.push(key);
            pool.initial_tick()
                .ensure_in_range()
                .map_err(|e| format!("pools[{i}]: {e}"))?;
            if pool.depth_per_tick == 0 {
                return Err(format!("pools[{i}]: depth_per_tick must be positive"));
            }
        }

        for account in &self.accounts {
            if account.id == self.engine_account {
                return Err(format!(
                    "account {} collides with engine_account",
                    account.id
                ));
            }
        }

        for (i, step) in self.steps.iter().enumerate() {
            if step.pool_index() >= self.pools.len() {
                return Err(format!(
                    "steps[{i}]: pool index {} out of range ({} pools)",
                    step.pool_index(),
                    self.pools.len()
                ));
            }
            if step.account() == self.engine_account() {
                return Err(format!("steps[{i}]: engine_account cannot act as a participant"));
            }
        }
        Ok(())
    }
}

/// Widen a configured quantity to the engine's amount type.
pub(crate) fn amount(value: u64) -> Amount {
    Amount::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        engine_account = 0

        [engine]
        max_fills_per_pass = 16

        [[pools]]
        currency0 = 0
        currency1 = 1
        tick_spacing = 10
        initial_tick = 500

        [[accounts]]
        id = 1
        balances = [{ asset = 0, amount = 1000000 }]

        [[steps]]
        action = "place"
        account = 1
        pool = 0
        tick = 605
        direction = "zero_for_one"
        amount = 100

        [[steps]]
        action = "redeem"
        account = 1
        pool = 0
        tick = 600
        direction = "zero_for_one"

        [[steps]]
        action = "swap"
        account = 1
        pool = 0
        direction = "one_for_zero"
        amount = 200000
    "#;

    #[test]
    fn test_parse_scenario() {
        let config = SimConfig::from_toml(SCENARIO).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.max_fills_per_pass, 16);
        assert_eq!(config.engine.max_levels_per_scan, 100_000);
        assert!(!config.fail_fast);

        let pool = &config.pools[0];
        assert_eq!(pool.fee_bps, 30);
        assert_eq!(pool.depth_per_tick, 1_000);
        assert_eq!(pool.tick_spacing.value(), 10);

        assert_eq!(config.steps.len(), 3);
        assert_eq!(
            config.steps[0],
            Step::Place {
                account: 1,
                pool: 0,
                tick: 605,
                direction: Direction::ZeroForOne,
                amount: 100,
            }
        );
        assert!(matches!(config.steps[1], Step::Redeem { amount: None, .. }));
        assert_eq!(config.steps[2].action(), "swap");
    }

    #[test]
    fn test_rejects_bad_tick_spacing() {
        let toml = SCENARIO.replace("tick_spacing = 10", "tick_spacing = 0");
        assert!(SimConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn test_validate_catches_bad_references() {
        let mut config = SimConfig::from_toml(SCENARIO).unwrap();
        config.steps.push(Step::Swap {
            account: 1,
            pool: 3,
            direction: Direction::ZeroForOne,
            amount: 1,
        });
        assert!(config.validate().unwrap_err().contains("pool index 3"));

        let mut config = SimConfig::from_toml(SCENARIO).unwrap();
        config.pools[0].currency0 = 5;
        assert!(config.validate().is_err());

        let mut config = SimConfig::from_toml(SCENARIO).unwrap();
        config.accounts[0].id = 0;
        assert!(config.validate().unwrap_err().contains("engine_account"));

        let mut config = SimConfig::from_toml(SCENARIO).unwrap();
        config.pools.push(config.pools[0].clone());
        assert!(config.validate().unwrap_err().contains("duplicate"));

        let mut config = SimConfig::from_toml(SCENARIO).unwrap();
        config.engine.max_fills_per_pass = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimConfig::from_file("does/not/exist.toml"),
            Err(SimError::Config(_))
        ));
    }
}
