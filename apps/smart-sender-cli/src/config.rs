use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use smart_sender::{InstructionSet, RpcNetworkConfig, SenderConfig};
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
    system_instruction,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

/// Plan file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendPlan {
    /// Delivery settings (defaults apply to anything left out)
    #[serde(default)]
    pub sender: SenderConfig,

    /// RPC confirmation settings
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Instruction sets, delivered in this order
    pub instruction_sets: Vec<InstructionSetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    /// How long to wait for each transaction to confirm
    pub confirm_timeout_secs: u64,

    /// First delay between confirmation polls
    pub poll_interval_ms: u64,

    /// Commitment a transaction must reach to count as delivered. Independent
    /// of `sender.commitment`, which only applies to slot and blockhash queries.
    pub confirmation_commitment: CommitmentLevel,
}

/// One instruction set: becomes exactly one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionSetConfig {
    /// Human-readable name (for output only)
    pub name: String,

    /// SOL transfers in this set. An empty list is skipped at send time.
    #[serde(default)]
    pub transfers: Vec<TransferConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Source keypair file. The fee payer pays when omitted; otherwise the
    /// keypair co-signs the set.
    pub from: Option<PathBuf>,

    /// Recipient (base58)
    pub to: String,

    pub lamports: u64,
}

/// A transfer with its keys resolved
#[derive(Debug, Clone)]
pub struct ResolvedTransfer {
    pub from: Option<Arc<Keypair>>,
    pub to: Pubkey,
    pub lamports: u64,
}

#[derive(Debug, Clone)]
pub struct ResolvedSet {
    pub name: String,
    pub transfers: Vec<ResolvedTransfer>,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            confirm_timeout_secs: 60,
            poll_interval_ms: 500,
            confirmation_commitment: CommitmentLevel::Confirmed,
        }
    }
}

impl RpcSettings {
    pub fn network_config(&self) -> RpcNetworkConfig {
        RpcNetworkConfig {
            confirm_timeout: Duration::from_secs(self.confirm_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            confirmation_commitment: CommitmentConfig {
                commitment: self.confirmation_commitment,
            },
            ..Default::default()
        }
    }
}

impl SendPlan {
    pub fn load(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> CliResult<Self> {
        let plan: SendPlan = serde_yaml::from_str(contents)?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> CliResult<()> {
        if self.instruction_sets.is_empty() {
            return Err(CliError::InvalidConfig(
                "Plan contains no instruction sets".to_string(),
            ));
        }
        if self.rpc.confirm_timeout_secs == 0 {
            return Err(CliError::InvalidConfig(
                "rpc.confirm_timeout_secs must be at least 1".to_string(),
            ));
        }
        self.sender
            .validate()
            .map_err(|e| CliError::InvalidConfig(e.to_string()))
    }

    /// Parse every recipient and read every source keypair. Keypair files
    /// named more than once are read once.
    pub fn resolve(&self) -> CliResult<Vec<ResolvedSet>> {
        let mut keypairs: HashMap<PathBuf, Arc<Keypair>> = HashMap::new();

        self.instruction_sets
            .iter()
            .map(|set| {
                let transfers = set
                    .transfers
                    .iter()
                    .map(|transfer| {
                        let to = Pubkey::from_str(&transfer.to).map_err(|e| {
                            CliError::InvalidConfig(format!(
                                "Invalid recipient '{}' in set '{}': {}",
                                transfer.to, set.name, e
                            ))
                        })?;
                        let from = transfer
                            .from
                            .as_ref()
                            .map(|path| load_keypair(&mut keypairs, path))
                            .transpose()?;

                        Ok(ResolvedTransfer {
                            from,
                            to,
                            lamports: transfer.lamports,
                        })
                    })
                    .collect::<CliResult<Vec<_>>>()?;

                Ok(ResolvedSet {
                    name: set.name.clone(),
                    transfers,
                })
            })
            .collect()
    }
}

impl ResolvedSet {
    /// Build the instruction set, with every distinct source keypair as a
    /// co-signer
    pub fn to_instruction_set(&self, fee_payer: &Pubkey) -> InstructionSet {
        let instructions = self
            .transfers
            .iter()
            .map(|transfer| {
                let source = transfer
                    .from
                    .as_ref()
                    .map(|keypair| keypair.pubkey())
                    .unwrap_or(*fee_payer);
                system_instruction::transfer(&source, &transfer.to, transfer.lamports)
            })
            .collect();

        let mut set = InstructionSet::new(instructions);
        for keypair in self.cosigners() {
            set = set.with_signer(keypair);
        }
        set
    }

    pub fn cosigners(&self) -> Vec<Arc<Keypair>> {
        let mut cosigners: Vec<Arc<Keypair>> = Vec::new();
        for keypair in self.transfers.iter().filter_map(|t| t.from.as_ref()) {
            if !cosigners.iter().any(|k| k.pubkey() == keypair.pubkey()) {
                cosigners.push(keypair.clone());
            }
        }
        cosigners
    }

    pub fn total_lamports(&self) -> u64 {
        self.transfers
            .iter()
            .fold(0u64, |total, t| total.saturating_add(t.lamports))
    }
}

pub fn read_keypair(path: &Path) -> CliResult<Keypair> {
    read_keypair_file(path).map_err(|e| CliError::Keypair {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_keypair(
    cache: &mut HashMap<PathBuf, Arc<Keypair>>,
    path: &Path,
) -> CliResult<Arc<Keypair>> {
    if let Some(keypair) = cache.get(path) {
        return Ok(keypair.clone());
    }
    let keypair = Arc::new(read_keypair(path)?);
    cache.insert(path.to_path_buf(), keypair.clone());
    Ok(keypair)
}
