//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Safety caps for one crossing-detection invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum resting levels executed in one invocation. Remaining
    /// eligible levels stay pending and the watermark is not advanced, so
    /// the next invocation picks them up.
    #[serde(default = "default_max_fills_per_pass")]
    pub max_fills_per_pass: u32,
    /// Maximum price levels walked by one scan of the tick window. A
    /// truncated scan advances the watermark only as far as it walked.
    #[serde(default = "default_max_levels_per_scan")]
    pub max_levels_per_scan: u64,
}

fn default_max_fills_per_pass() -> u32 {
    256
}

fn default_max_levels_per_scan() -> u64 {
    100_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fills_per_pass: default_max_fills_per_pass(),
            max_levels_per_scan: default_max_levels_per_scan(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_fills_per_pass == 0 {
            return Err("max_fills_per_pass must be positive".to_string());
        }
        if self.max_levels_per_scan == 0 {
            return Err("max_levels_per_scan must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_caps_rejected() {
        let config = EngineConfig {
            max_fills_per_pass: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            max_levels_per_scan: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: EngineConfig = toml::from_str("max_fills_per_pass = 8").unwrap();
        assert_eq!(config.max_fills_per_pass, 8);
        assert_eq!(config.max_levels_per_scan, 100_000);
    }
}
