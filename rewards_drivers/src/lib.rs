//! Shared driver plumbing: YAML configuration and logging setup.

pub mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rewards::{BettorKind, Rule, RuleError, StrategistKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub bot: ConfigBot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub shoe_size: u8,
    pub reshuffle_threshold: f64,
    pub agent_chips: f64,
    pub blackjack_payout: f64,
    pub blackjack_with_split_aces: bool,
    pub dealer_peeks: bool,
    pub double_after_split: bool,
    pub hit_after_split_aces: bool,
    pub hit_soft_17: bool,
    pub resplit_aces: u8,
    pub resplit_upto: u8,
    pub split_uneven: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigBot {
    pub strategist: StrategistKind,
    pub bettor: BettorKind,
}

impl TryFrom<ConfigRule> for Rule {
    type Error = ConfigError;

    fn try_from(config: ConfigRule) -> Result<Rule, Self::Error> {
        let rule = Rule {
            shoe_size: config.shoe_size,
            reshuffle_threshold: config.reshuffle_threshold,
            agent_chips: config.agent_chips,
            blackjack_payout: config.blackjack_payout,
            blackjack_with_split_aces: config.blackjack_with_split_aces,
            dealer_peeks: config.dealer_peeks,
            double_after_split: config.double_after_split,
            hit_after_split_aces: config.hit_after_split_aces,
            hit_soft_17: config.hit_soft_17,
            resplit_aces: config.resplit_aces,
            resplit_upto: config.resplit_upto,
            split_uneven: config.split_uneven,
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl Config {
    /// Reads and parses a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_yaml(&content)
    }

    /// Parses a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Errors from loading or converting a driver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Rule(#[from] RuleError),
}
