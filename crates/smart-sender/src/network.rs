use crate::{Confirmation, DeliveryError, ValidityWindow};
use async_trait::async_trait;
use solana_sdk::{
    clock::Slot, commitment_config::CommitmentConfig, hash::Hash, transaction::Transaction,
};
use std::sync::Arc;

/// Transport the engine submits through.
///
/// `send_and_confirm` must classify its failures: a transaction that was
/// rejected by the runtime is [`DeliveryError::Transaction`], a transaction
/// that could not be confirmed in time is [`DeliveryError::Timeout`], and
/// anything else is a transport error.
#[async_trait]
pub trait Network: Send + Sync {
    /// Submit a signed transaction and wait until it is confirmed
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Confirmation, DeliveryError>;

    async fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, DeliveryError>;

    /// Latest blockhash and the last block height at which it is valid
    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), DeliveryError>;

    /// Fetch the current slot and blockhash together
    async fn validity_window(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<ValidityWindow, DeliveryError> {
        let (slot, (blockhash, last_valid_block_height)) = futures::try_join!(
            self.get_slot(commitment),
            self.get_latest_blockhash(commitment)
        )?;

        Ok(ValidityWindow {
            slot,
            blockhash,
            last_valid_block_height,
        })
    }
}

#[async_trait]
impl<T: Network + ?Sized> Network for Arc<T> {
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Confirmation, DeliveryError> {
        (**self).send_and_confirm(transaction).await
    }

    async fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, DeliveryError> {
        (**self).get_slot(commitment).await
    }

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), DeliveryError> {
        (**self).get_latest_blockhash(commitment).await
    }

    async fn validity_window(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<ValidityWindow, DeliveryError> {
        (**self).validity_window(commitment).await
    }
}
