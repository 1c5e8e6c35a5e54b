//! Engine configuration

use crate::error::{Error, Result};
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable thresholds and windows for the risk analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Velocity lookback window in minutes (default: 60)
    pub velocity_window_minutes: i64,

    /// Inbound count above which velocity is considered high (default: 10)
    pub velocity_high_count: u64,

    /// Inbound count above which velocity is considered moderate (default: 5)
    pub velocity_moderate_count: u64,

    /// Fan-in lookback window in minutes (default: 15)
    pub bot_window_minutes: i64,

    /// Distinct-sender count at which the fan-in override fires (default: 5)
    pub bot_distinct_sender_threshold: usize,

    /// Amount above which the high-value amplifier may fire (default: 10 000)
    pub high_value_threshold: Decimal,

    /// Scores at or above this are MALICIOUS (default: 70)
    pub malicious_cutoff: u8,

    /// Scores at or above this (and below the malicious cutoff) are
    /// SUSPICIOUS (default: 30)
    pub suspicious_cutoff: u8,

    /// Verification oracle timeout in milliseconds (default: 2000)
    pub verifier_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            velocity_window_minutes: 60,
            velocity_high_count: 10,
            velocity_moderate_count: 5,
            bot_window_minutes: 15,
            bot_distinct_sender_threshold: 5,
            high_value_threshold: Decimal::from(10_000),
            malicious_cutoff: 70,
            suspicious_cutoff: 30,
            verifier_timeout_ms: 2_000,
        }
    }
}

impl EngineConfig {
    /// Check internal consistency of the configured values
    pub fn validate(&self) -> Result<()> {
        if self.velocity_window_minutes <= 0 || self.bot_window_minutes <= 0 {
            return Err(Error::InvalidConfig(
                "lookback windows must be positive".to_string(),
            ));
        }
        if self.suspicious_cutoff >= self.malicious_cutoff {
            return Err(Error::InvalidConfig(format!(
                "suspicious cutoff {} must be below malicious cutoff {}",
                self.suspicious_cutoff, self.malicious_cutoff
            )));
        }
        if self.bot_distinct_sender_threshold == 0 {
            return Err(Error::InvalidConfig(
                "distinct-sender threshold must be at least 1".to_string(),
            ));
        }
        if self.verifier_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "verifier timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Velocity lookback window
    pub fn velocity_window(&self) -> Duration {
        Duration::minutes(self.velocity_window_minutes)
    }

    /// Fan-in lookback window
    pub fn bot_window(&self) -> Duration {
        Duration::minutes(self.bot_window_minutes)
    }

    /// Verification oracle timeout
    pub fn verifier_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.verifier_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_cutoffs_rejected() {
        let config = EngineConfig {
            malicious_cutoff: 30,
            suspicious_cutoff: 70,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = EngineConfig {
            bot_window_minutes: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
