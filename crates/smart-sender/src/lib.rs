/*!
# Smart Sender

Ordered, expiry-aware delivery of a batch of instruction sets to Solana.

Each instruction set becomes one transaction. The whole batch is signed in a
single [`BatchSigner::sign_all`] call, then delivered strictly one
transaction at a time. When the blockhash the batch was built against runs
out (150 slots after the slot it was fetched at), the unsent remainder is
rebuilt against a fresh blockhash and re-signed as one batch. Timeouts are
retried up to `max_signing_attempts`; any other failure is final for its item.

## Quick Start

```rust,no_run
use smart_sender::{
    InstructionSet, KeypairBatchSigner, RpcClient, RpcNetwork, SmartSender,
};
use solana_sdk::signature::Keypair;
use std::sync::Arc;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let rpc_client = Arc::new(RpcClient::new("https://api.devnet.solana.com".to_string()));
let network = RpcNetwork::new(rpc_client);
let signer = KeypairBatchSigner::new(Keypair::new());

let instruction_sets: Vec<InstructionSet> = vec![/* your instruction sets */];

let summary = SmartSender::new(network, signer)
    .with_instruction_sets(instruction_sets)
    .on_progress(|index, signature| println!("{index}: {signature}"))
    .on_failure(|event| eprintln!("{}: {}", event.original_index, event.error))
    .send()
    .await?;

println!(
    "Sent {} of {} transactions",
    summary.successful_items, summary.total_items
);
# Ok(())
# }
```

## Custom Configuration

```rust,no_run
# use smart_sender::{KeypairBatchSigner, RpcClient, RpcNetwork, SenderConfig, SmartSender};
# use solana_sdk::{commitment_config::CommitmentLevel, signature::Keypair};
# use std::sync::Arc;
# let rpc_client = Arc::new(RpcClient::new("https://api.devnet.solana.com".to_string()));
let config = SenderConfig {
    max_signing_attempts: 5,
    abort_on_failure: false,
    commitment: CommitmentLevel::Processed,
};

let sender = SmartSender::new(RpcNetwork::new(rpc_client), KeypairBatchSigner::new(Keypair::new()))
    .with_config(config);
```
*/

pub mod builder;
mod config;
mod error;
mod network;
mod rpc;
mod sender;
mod signer;
mod types;

pub use config::{RpcNetworkConfig, SenderConfig};
pub use error::{DeliveryError, SenderError, SenderResult, SignerError};
pub use network::Network;
pub use rpc::RpcNetwork;
pub use sender::{
    DeliverySummary, FailedItem, FailureCallback, FailureEvent, ProgressCallback,
    ReSignCallback, SmartSender,
};
pub use signer::{BatchSigner, KeypairBatchSigner};
pub use types::{
    Confirmation, DeliveryState, InstructionSet, SignedBatch, ValidityWindow, EXPIRY_MARGIN,
};

// Re-export key Solana types for convenience
pub use solana_client::nonblocking::rpc_client::RpcClient;
pub use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
