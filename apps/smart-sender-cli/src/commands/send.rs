use crate::config::{read_keypair, SendPlan};
use crate::error::{CliError, CliResult};
use smart_sender::{KeypairBatchSigner, RpcNetwork, SmartSender};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::signature::Signer;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

pub async fn execute(
    plan_path: PathBuf,
    keypair_path: PathBuf,
    rpc_url: String,
    no_abort: bool,
    max_signing_attempts: Option<usize>,
) -> CliResult<()> {
    println!("📄 Loading plan {}...", plan_path.display());
    let mut plan = SendPlan::load(&plan_path)?;
    if no_abort {
        plan.sender.abort_on_failure = false;
    }
    if let Some(max_signing_attempts) = max_signing_attempts {
        plan.sender.max_signing_attempts = max_signing_attempts;
    }

    println!("🔑 Loading fee payer keypair...");
    let fee_payer = read_keypair(&keypair_path)?;
    let fee_payer_pubkey = fee_payer.pubkey();
    println!("✅ Fee payer: {}", fee_payer_pubkey);

    let resolved = plan.resolve()?;
    let names: Vec<String> = resolved.iter().map(|set| set.name.clone()).collect();
    let instruction_sets = resolved
        .iter()
        .map(|set| set.to_instruction_set(&fee_payer_pubkey))
        .collect();

    let rpc_client = Arc::new(RpcClient::new_with_commitment(
        rpc_url.clone(),
        plan.sender.commitment_config(),
    ));
    let network = RpcNetwork::with_config(rpc_client, plan.rpc.network_config());
    let signer = KeypairBatchSigner::new(fee_payer);

    let set_count = names.len();
    info!("Sending {} instruction sets via {}", set_count, rpc_url);
    println!("🚀 Sending {} instruction sets...", set_count);

    let summary = SmartSender::new(network, signer)
        .with_config(plan.sender.clone())
        .with_instruction_sets(instruction_sets)
        .on_progress(|index, signature| {
            println!("   ✅ [{}] {}", index, signature);
        })
        .on_resign(|attempt, index| {
            if attempt == 0 {
                println!("   🔄 Blockhash expired, re-signing from [{}]", index);
            } else {
                println!(
                    "   🔄 Re-signing from [{}] after timeout (attempt {})",
                    index, attempt
                );
            }
        })
        .on_failure(move |event| {
            let name = names
                .get(event.original_index)
                .map(String::as_str)
                .unwrap_or("?");
            println!(
                "   ❌ [{}] '{}' failed after {} successful: {}",
                event.index, name, event.successful_items, event.error
            );
        })
        .send()
        .await?;

    println!();
    println!("📊 Summary:");
    println!("   Transactions: {}", summary.total_items);
    println!("   Delivered: {}", summary.successful_items);
    if summary.skipped_empty_sets > 0 {
        println!("   Skipped empty sets: {}", summary.skipped_empty_sets);
    }
    if summary.aborted {
        println!("   Aborted after the first failure");
    }

    if !summary.is_complete() {
        return Err(CliError::DeliveryIncomplete {
            failed: summary.total_items - summary.successful_items,
            total: summary.total_items,
        });
    }

    println!("🎉 All transactions delivered");
    Ok(())
}
