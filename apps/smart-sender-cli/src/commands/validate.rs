use crate::config::SendPlan;
use crate::error::CliResult;
use solana_sdk::{native_token::lamports_to_sol, signature::Signer};
use std::path::PathBuf;

pub fn execute(plan_path: PathBuf) -> CliResult<()> {
    println!("📄 Validating plan {}...", plan_path.display());

    let plan = SendPlan::load(&plan_path)?;
    let sets = plan.resolve()?;

    println!("✅ Plan is valid");
    println!("   Max signing attempts: {}", plan.sender.max_signing_attempts);
    println!("   Abort on failure: {}", plan.sender.abort_on_failure);
    println!("   Commitment: {:?}", plan.sender.commitment);
    println!("   Confirm timeout: {}s", plan.rpc.confirm_timeout_secs);
    println!();

    for (i, set) in sets.iter().enumerate() {
        if set.transfers.is_empty() {
            println!("   {}. {} (empty, will be skipped)", i, set.name);
            continue;
        }

        println!(
            "   {}. {} - {} transfer(s), {} SOL",
            i,
            set.name,
            set.transfers.len(),
            lamports_to_sol(set.total_lamports())
        );
        for transfer in &set.transfers {
            let source = transfer
                .from
                .as_ref()
                .map(|keypair| keypair.pubkey().to_string())
                .unwrap_or_else(|| "fee payer".to_string());
            println!(
                "      {} -> {}: {} lamports",
                source, transfer.to, transfer.lamports
            );
        }
        for cosigner in set.cosigners() {
            println!("      co-signer: {}", cosigner.pubkey());
        }
    }

    Ok(())
}
