use solana_sdk::{signature::Signature, transaction::TransactionError};
use thiserror::Error;

pub type SenderResult<T> = Result<T, SenderError>;

/// Errors returned from [`SmartSender::send`](crate::SmartSender::send).
///
/// Per-item delivery failures never show up here; they are reported through
/// the failure callback and the [`DeliverySummary`](crate::DeliverySummary).
#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Signer is not connected (no public key)")]
    SignerNotConnected,

    #[error("No instruction sets provided")]
    NoInstructionSets,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to prepare the signed batch: {0}")]
    Preparation(#[source] DeliveryError),
}

/// Errors that can occur while delivering a single item of the batch
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Transaction {signature} failed: {error}")]
    Transaction {
        signature: Signature,
        error: TransactionError,
    },

    #[error("Transaction was not confirmed in time{}", fmt_signature(.signature))]
    Timeout { signature: Option<Signature> },

    #[error("RPC client error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("Gave up after {attempts} signing attempts")]
    MaxResignAttemptsReached { attempts: usize },

    #[error("{0}")]
    Other(String),
}

impl DeliveryError {
    /// Timeouts are the only failures worth re-signing for; everything else
    /// is terminal for the item.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Timeout { .. })
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            DeliveryError::Transaction { signature, .. } => Some(signature),
            DeliveryError::Timeout { signature } => signature.as_ref(),
            _ => None,
        }
    }
}

/// Errors raised by a [`BatchSigner`](crate::BatchSigner) or while
/// partially signing with co-signers
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Signer is not connected")]
    NotConnected,

    #[error(transparent)]
    Signing(#[from] solana_sdk::signer::SignerError),

    #[error("Signer returned {actual} transactions, expected {expected}")]
    BatchLengthMismatch { expected: usize, actual: usize },

    #[error("Transaction {index} is missing required signatures")]
    MissingSignatures { index: usize },

    #[error("Signing request rejected: {0}")]
    Rejected(String),
}

fn fmt_signature(signature: &Option<Signature>) -> String {
    match signature {
        Some(signature) => format!(" ({signature})"),
        None => String::new(),
    }
}
