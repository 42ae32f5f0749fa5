//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the auction engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds a team has to bid or pass before the turn times out.
    pub timer_duration_secs: u32,

    /// Whether the countdown is active. Disabling freezes the countdown
    /// without affecting round state.
    pub timer_enabled: bool,

    /// Seconds the settled outcome stays on display before the queue
    /// advances to the next player.
    pub settlement_hold_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timer_duration_secs: 60,
            timer_enabled: true,
            settlement_hold_secs: 3,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timer_duration_secs == 0 {
            return Err(ConfigValidationError::ZeroTimerDuration);
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Timer duration cannot be zero")]
    ZeroTimerDuration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timer_duration_secs, 60);
        assert_eq!(config.settlement_hold_secs, 3);
        assert!(config.timer_enabled);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = EngineConfig {
            timer_duration_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroTimerDuration)
        ));
    }
}
