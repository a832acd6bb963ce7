use async_trait::async_trait;
use smart_sender::{BatchSigner, KeypairBatchSigner, SignerError};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, transaction::Transaction};
use std::{collections::HashMap, sync::Mutex};

/// How the mock misbehaves on a given call
#[derive(Debug, Clone)]
pub enum SignerFault {
    /// The wallet refuses the whole batch
    Reject(String),
    /// The wallet returns one transaction fewer than requested
    DropLast,
}

/// [`BatchSigner`] that signs with a real keypair and records every call.
///
/// Calls are numbered from 1.
pub struct MockSigner {
    inner: KeypairBatchSigner,
    faults: Mutex<HashMap<usize, SignerFault>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MockSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self::from_signer(KeypairBatchSigner::new(keypair))
    }

    pub fn disconnected() -> Self {
        Self::from_signer(KeypairBatchSigner::disconnected())
    }

    fn from_signer(inner: KeypairBatchSigner) -> Self {
        Self {
            inner,
            faults: Mutex::new(HashMap::new()),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fault(self, call: usize, fault: SignerFault) -> Self {
        self.faults.lock().unwrap().insert(call, fault);
        self
    }

    pub fn calls(&self) -> usize {
        self.batch_sizes.lock().unwrap().len()
    }

    /// Size of the batch handed over on each call
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchSigner for MockSigner {
    fn pubkey(&self) -> Option<Pubkey> {
        self.inner.pubkey()
    }

    async fn sign_all(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, SignerError> {
        let fault = {
            let mut batch_sizes = self.batch_sizes.lock().unwrap();
            batch_sizes.push(transactions.len());
            let call = batch_sizes.len();
            self.faults.lock().unwrap().remove(&call)
        };

        match fault {
            Some(SignerFault::Reject(reason)) => Err(SignerError::Rejected(reason)),
            Some(SignerFault::DropLast) => {
                let mut signed = self.inner.sign_all(transactions).await?;
                signed.pop();
                Ok(signed)
            }
            None => self.inner.sign_all(transactions).await,
        }
    }
}
