use crate::{SenderError, SenderResult};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::time::Duration;

/// Configuration for the delivery engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Maximum number of times a single item is submitted while it keeps
    /// timing out. Must be at least 1.
    pub max_signing_attempts: usize,

    /// Stop processing the rest of the batch after an unrecoverable item failure
    pub abort_on_failure: bool,

    /// Commitment used for slot and blockhash queries
    pub commitment: CommitmentLevel,
}

impl SenderConfig {
    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }

    pub fn validate(&self) -> SenderResult<()> {
        if self.max_signing_attempts == 0 {
            return Err(SenderError::Config(
                "max_signing_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            max_signing_attempts: 3,
            abort_on_failure: true,
            commitment: CommitmentLevel::Confirmed,
        }
    }
}

/// Settings for [`RpcNetwork`](crate::RpcNetwork)
#[derive(Debug, Clone)]
pub struct RpcNetworkConfig {
    /// How long to wait for a submitted transaction to reach
    /// `confirmation_commitment` before reporting a timeout
    pub confirm_timeout: Duration,

    /// First delay between signature status polls
    pub poll_interval: Duration,

    /// Upper bound for the delay between polls
    pub max_poll_interval: Duration,

    /// Commitment a transaction must reach to count as confirmed
    pub confirmation_commitment: CommitmentConfig,
}

impl Default for RpcNetworkConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
            max_poll_interval: Duration::from_secs(2),
            confirmation_commitment: CommitmentConfig::confirmed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SenderConfig::default();
        assert_eq!(config.max_signing_attempts, 3);
        assert!(config.abort_on_failure);
        assert_eq!(config.commitment_config(), CommitmentConfig::confirmed());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = SenderConfig {
            max_signing_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SenderError::Config(_))));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: SenderConfig =
            serde_yaml::from_str("abort_on_failure: false\ncommitment: processed\n").unwrap();
        assert_eq!(config.max_signing_attempts, 3);
        assert!(!config.abort_on_failure);
        assert_eq!(config.commitment, CommitmentLevel::Processed);
    }

    #[test]
    fn test_default_rpc_network_config() {
        let config = RpcNetworkConfig::default();
        assert_eq!(config.confirm_timeout, Duration::from_secs(60));
        assert!(config.poll_interval < config.max_poll_interval);
    }
}
