//! Cabinet Configuration

use serde::{Deserialize, Serialize};

/// Tunable cabinet parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinetConfig {
    /// Balance granted on first boot and after a session reset.
    pub default_balance: u32,
    /// Ceiling the balance saturates at.
    pub max_balance: u32,
    /// Ticks the reels stay in motion.
    pub spin_ticks: u8,
    /// Ticks the win celebration lasts.
    pub win_ticks: u8,
    /// Ticks before a dead session resets.
    pub game_over_ticks: u8,
    /// Timer period in milliseconds.
    pub tick_ms: u64,
}

impl Default for CabinetConfig {
    fn default() -> Self {
        Self {
            default_balance: 100,
            max_balance: 1_000_000,
            spin_ticks: 4,
            win_ticks: 6,
            game_over_ticks: 10,
            tick_ms: 500,
        }
    }
}

impl CabinetConfig {
    /// Export as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the parameters make a playable cabinet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_balance > self.max_balance {
            return Err(ConfigError::Invalid(format!(
                "default balance {} exceeds max balance {}",
                self.default_balance, self.max_balance
            )));
        }
        if self.spin_ticks == 0 || self.win_ticks == 0 || self.game_over_ticks == 0 {
            return Err(ConfigError::Invalid(
                "countdowns must be at least 1 tick".into(),
            ));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be at least 1".into()));
        }
        Ok(())
    }
}

/// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let config = CabinetConfig {
            default_balance: 200,
            tick_ms: 250,
            ..Default::default()
        };

        let json = config.to_json().unwrap();
        let parsed = CabinetConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let parsed = CabinetConfig::from_json(r#"{ "default_balance": 50 }"#).unwrap();
        assert_eq!(parsed.default_balance, 50);
        assert_eq!(parsed.max_balance, CabinetConfig::default().max_balance);
        assert_eq!(parsed.spin_ticks, 4);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let over = CabinetConfig {
            default_balance: 10,
            max_balance: 5,
            ..Default::default()
        };
        assert!(over.validate().is_err());

        let frozen = CabinetConfig {
            spin_ticks: 0,
            ..Default::default()
        };
        assert!(frozen.validate().is_err());
    }
}
