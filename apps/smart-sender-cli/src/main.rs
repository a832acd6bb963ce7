use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "smart-sender")]
#[command(about = "Smart Sender CLI - Ordered, expiry-aware transaction batches on Solana")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign and deliver every instruction set in a plan, in order
    Send {
        /// Plan file (YAML)
        #[arg(short, long)]
        plan: PathBuf,

        /// Fee payer keypair file
        #[arg(short, long)]
        keypair: PathBuf,

        /// Solana RPC URL
        #[arg(short, long, default_value = "https://api.devnet.solana.com")]
        rpc_url: String,

        /// Keep going after an item fails for good
        #[arg(long)]
        no_abort: bool,

        /// Override the plan's signing attempt budget per item
        #[arg(long)]
        max_signing_attempts: Option<usize>,
    },

    /// Parse a plan and print what it would send, without touching the network
    Validate {
        /// Plan file (YAML)
        #[arg(short, long)]
        plan: PathBuf,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Send {
            plan,
            keypair,
            rpc_url,
            no_abort,
            max_signing_attempts,
        } => {
            commands::send::execute(plan, keypair, rpc_url, no_abort, max_signing_attempts).await
        }

        Commands::Validate { plan } => commands::validate::execute(plan),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
