use crate::SignerError;
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};
use std::sync::Arc;
use tracing::debug;

/// The signing authority (typically a wallet).
///
/// `sign_all` is all-or-nothing: it returns every transaction signed, in the
/// order given, or an error. Implementations may take arbitrarily long, e.g.
/// while a human approves the batch.
#[async_trait]
pub trait BatchSigner: Send + Sync {
    /// Identity of the signer, used as fee payer. `None` while disconnected.
    fn pubkey(&self) -> Option<Pubkey>;

    async fn sign_all(&self, transactions: Vec<Transaction>)
        -> Result<Vec<Transaction>, SignerError>;
}

#[async_trait]
impl<T: BatchSigner + ?Sized> BatchSigner for Arc<T> {
    fn pubkey(&self) -> Option<Pubkey> {
        (**self).pubkey()
    }

    async fn sign_all(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, SignerError> {
        (**self).sign_all(transactions).await
    }
}

/// [`BatchSigner`] backed by a local keypair
pub struct KeypairBatchSigner {
    keypair: Option<Keypair>,
}

impl KeypairBatchSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Some(keypair),
        }
    }

    /// A signer without an identity, as a wallet looks before it connects
    pub fn disconnected() -> Self {
        Self { keypair: None }
    }
}

#[async_trait]
impl BatchSigner for KeypairBatchSigner {
    fn pubkey(&self) -> Option<Pubkey> {
        self.keypair.as_ref().map(|keypair| keypair.pubkey())
    }

    async fn sign_all(
        &self,
        mut transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, SignerError> {
        let keypair = self.keypair.as_ref().ok_or(SignerError::NotConnected)?;

        for (index, transaction) in transactions.iter_mut().enumerate() {
            let recent_blockhash = transaction.message.recent_blockhash;
            transaction.try_partial_sign(&[keypair], recent_blockhash)?;

            if !transaction.is_signed() {
                return Err(SignerError::MissingSignatures { index });
            }
        }

        debug!("Signed batch of {} transactions", transactions.len());
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::Message,
    };

    fn unsigned_tx(payer: &Pubkey, extra_signer: Option<&Pubkey>) -> Transaction {
        let accounts = extra_signer
            .map(|signer| vec![AccountMeta::new_readonly(*signer, true)])
            .unwrap_or_default();
        let ix = Instruction::new_with_bytes(Pubkey::new_unique(), &[1, 2, 3], accounts);
        let message = Message::new_with_blockhash(&[ix], Some(payer), &Hash::new_unique());
        Transaction::new_unsigned(message)
    }

    #[test]
    fn test_signs_whole_batch() {
        let keypair = Keypair::new();
        let payer = keypair.pubkey();
        let signer = KeypairBatchSigner::new(keypair);

        let txs = vec![unsigned_tx(&payer, None), unsigned_tx(&payer, None)];
        let signed = tokio_test::block_on(signer.sign_all(txs)).unwrap();

        assert_eq!(signed.len(), 2);
        for tx in &signed {
            assert!(tx.is_signed());
            assert!(tx.verify().is_ok());
        }
    }

    #[test]
    fn test_completes_partially_signed_transaction() {
        let keypair = Keypair::new();
        let payer = keypair.pubkey();
        let cosigner = Keypair::new();
        let signer = KeypairBatchSigner::new(keypair);

        let mut tx = unsigned_tx(&payer, Some(&cosigner.pubkey()));
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&cosigner], blockhash).unwrap();
        assert!(!tx.is_signed());

        let signed = tokio_test::block_on(signer.sign_all(vec![tx])).unwrap();
        assert!(signed[0].is_signed());
        assert!(signed[0].verify().is_ok());
    }

    #[test]
    fn test_missing_cosignature_fails_whole_batch() {
        let keypair = Keypair::new();
        let payer = keypair.pubkey();
        let cosigner = Keypair::new();
        let signer = KeypairBatchSigner::new(keypair);

        let txs = vec![
            unsigned_tx(&payer, None),
            unsigned_tx(&payer, Some(&cosigner.pubkey())),
        ];
        let result = tokio_test::block_on(signer.sign_all(txs));

        assert!(matches!(
            result,
            Err(SignerError::MissingSignatures { index: 1 })
        ));
    }

    #[test]
    fn test_disconnected_signer() {
        let signer = KeypairBatchSigner::disconnected();
        assert!(signer.pubkey().is_none());

        let result = tokio_test::block_on(signer.sign_all(vec![]));
        assert!(matches!(result, Err(SignerError::NotConnected)));
    }
}
