use crate::{Confirmation, DeliveryError, Network, RpcNetworkConfig};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    clock::Slot, commitment_config::CommitmentConfig, hash::Hash, signature::Signature,
    transaction::Transaction,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// [`Network`] over a Solana JSON-RPC endpoint
pub struct RpcNetwork {
    rpc_client: Arc<RpcClient>,
    config: RpcNetworkConfig,
}

impl RpcNetwork {
    pub fn new(rpc_client: Arc<RpcClient>) -> Self {
        Self::with_config(rpc_client, RpcNetworkConfig::default())
    }

    pub fn with_config(rpc_client: Arc<RpcClient>, config: RpcNetworkConfig) -> Self {
        Self { rpc_client, config }
    }

    pub fn rpc_client(&self) -> &Arc<RpcClient> {
        &self.rpc_client
    }

    fn confirmation_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.poll_interval,
            max_interval: self.config.max_poll_interval,
            max_elapsed_time: Some(self.config.confirm_timeout),
            multiplier: 1.5,
            ..Default::default()
        }
    }

    /// Poll the signature status until it reaches the confirmation
    /// commitment. Running out of time surfaces as the last transient error,
    /// which is always a timeout.
    async fn wait_for_confirmation(&self, signature: Signature) -> Result<Slot, DeliveryError> {
        let rpc_client = self.rpc_client.clone();
        let commitment = self.config.confirmation_commitment;

        retry(self.confirmation_backoff(), || {
            let rpc_client = rpc_client.clone();

            async move {
                let statuses = rpc_client
                    .get_signature_statuses(&[signature])
                    .await
                    .map_err(|e| backoff::Error::Permanent(DeliveryError::Rpc(e)))?
                    .value;

                let pending = move || {
                    backoff::Error::transient(DeliveryError::Timeout {
                        signature: Some(signature),
                    })
                };

                let status = statuses.into_iter().next().flatten().ok_or_else(pending)?;

                if let Some(error) = status.err.clone() {
                    return Err(backoff::Error::Permanent(DeliveryError::Transaction {
                        signature,
                        error,
                    }));
                }

                if !status.satisfies_commitment(commitment) {
                    return Err(pending());
                }

                Ok(status.slot)
            }
        })
        .await
    }
}

#[async_trait]
impl Network for RpcNetwork {
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Confirmation, DeliveryError> {
        let send_config = RpcSendTransactionConfig {
            skip_preflight: true,
            preflight_commitment: Some(self.config.confirmation_commitment.commitment),
            ..Default::default()
        };

        let signature = self
            .rpc_client
            .send_transaction_with_config(transaction, send_config)
            .await?;
        debug!("Submitted {}", signature);

        let slot = self
            .wait_for_confirmation(signature)
            .await
            .inspect_err(|e| warn!("Confirmation of {} failed: {}", signature, e))?;

        Ok(Confirmation { signature, slot })
    }

    async fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, DeliveryError> {
        Ok(self.rpc_client.get_slot_with_commitment(commitment).await?)
    }

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), DeliveryError> {
        Ok(self
            .rpc_client
            .get_latest_blockhash_with_commitment(commitment)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use solana_client::{rpc_client::Mocks, rpc_request::RpcRequest};
    use solana_sdk::{
        pubkey::Pubkey,
        signature::{Keypair, Signer},
        system_instruction,
        transaction::TransactionError,
    };
    use std::{collections::HashMap, time::Duration};

    fn signed_transaction() -> Transaction {
        let payer = Keypair::new();
        Transaction::new_signed_with_payer(
            &[system_instruction::transfer(
                &payer.pubkey(),
                &Pubkey::new_unique(),
                1,
            )],
            Some(&payer.pubkey()),
            &[&payer],
            Hash::new_unique(),
        )
    }

    fn status_reply(status: Value) -> Mocks {
        HashMap::from([(
            RpcRequest::GetSignatureStatuses,
            json!({
                "context": { "slot": 42 },
                "value": [status],
            }),
        )])
    }

    fn mock_network(url: &str, mocks: Mocks, confirm_timeout: Duration) -> RpcNetwork {
        RpcNetwork::with_config(
            Arc::new(RpcClient::new_mock_with_mocks(url.to_string(), mocks)),
            RpcNetworkConfig {
                confirm_timeout,
                poll_interval: Duration::from_millis(100),
                max_poll_interval: Duration::from_millis(200),
                ..Default::default()
            },
        )
    }

    fn network() -> RpcNetwork {
        let client = RpcClient::new("http://localhost:8899".to_string());
        RpcNetwork::with_config(
            Arc::new(client),
            RpcNetworkConfig {
                confirm_timeout: Duration::from_secs(5),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_confirmation_backoff_respects_timeout() {
        let network = network();
        let backoff = network.confirmation_backoff();

        assert_eq!(backoff.max_elapsed_time, Some(Duration::from_secs(5)));
        assert_eq!(backoff.initial_interval, Duration::from_millis(500));
        assert_eq!(backoff.max_interval, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_not_a_timeout() {
        let network = RpcNetwork::new(Arc::new(RpcClient::new(
            "http://127.0.0.1:1".to_string(),
        )));

        let result = network.get_slot(CommitmentConfig::confirmed()).await;
        let err = result.unwrap_err();
        assert!(matches!(err, DeliveryError::Rpc(_)));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_confirmed_status_reports_its_slot() {
        let network = mock_network(
            "succeeds",
            status_reply(json!({
                "slot": 42,
                "confirmations": 1,
                "status": { "Ok": null },
                "err": null,
                "confirmationStatus": "confirmed",
            })),
            Duration::from_secs(5),
        );
        let transaction = signed_transaction();

        let confirmation = network.send_and_confirm(&transaction).await.unwrap();

        assert_eq!(confirmation.signature, transaction.signatures[0]);
        assert_eq!(confirmation.slot, 42);
    }

    #[tokio::test]
    async fn test_failed_status_is_a_transaction_error() {
        let network = mock_network(
            "succeeds",
            status_reply(json!({
                "slot": 42,
                "confirmations": null,
                "status": { "Err": "AccountInUse" },
                "err": "AccountInUse",
                "confirmationStatus": "processed",
            })),
            Duration::from_secs(5),
        );
        let transaction = signed_transaction();

        let err = network.send_and_confirm(&transaction).await.unwrap_err();

        assert!(!err.is_timeout());
        match err {
            DeliveryError::Transaction { signature, error } => {
                assert_eq!(signature, transaction.signatures[0]);
                assert_eq!(error, TransactionError::AccountInUse);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_signature_times_out() {
        // This endpoint never finds the signature
        let network = mock_network("sig_not_found", HashMap::new(), Duration::from_secs(1));
        let transaction = signed_transaction();

        let err = network.send_and_confirm(&transaction).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.signature(), Some(&transaction.signatures[0]));
    }
}
