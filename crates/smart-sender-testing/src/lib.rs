mod event_log;
mod mock_network;
mod mock_signer;

pub use event_log::{Event, EventLog};
pub use mock_network::{MockNetwork, SendOutcome, SentTransaction};
pub use mock_signer::{MockSigner, SignerFault};

use smart_sender::{InstructionSet, SenderConfig, SmartSender};
use solana_sdk::{
    clock::Slot,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::Arc;

/// Standard test constants
pub const TEST_WINDOW_SLOT: Slot = 1_000;
pub const TEST_PROGRAM_ID: Pubkey = Pubkey::new_from_array([7; 32]);

/// Instruction with no accounts, distinguished by `tag` so that every
/// transaction in a batch gets its own signature
pub fn tagged_instruction(tag: u8) -> Instruction {
    Instruction::new_with_bytes(TEST_PROGRAM_ID, &[tag], vec![])
}

/// Instruction that needs `cosigner`'s signature
pub fn cosigned_instruction(tag: u8, cosigner: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(
        TEST_PROGRAM_ID,
        &[tag],
        vec![AccountMeta::new(*cosigner, true)],
    )
}

/// `count` single-instruction sets tagged 0..count
pub fn instruction_sets(count: usize) -> Vec<InstructionSet> {
    (0..count)
        .map(|tag| InstructionSet::new(vec![tagged_instruction(tag as u8)]))
        .collect()
}

/// A set whose only instruction must be co-signed by a fresh keypair
pub fn cosigned_instruction_set(tag: u8) -> (InstructionSet, Arc<Keypair>) {
    let cosigner = Arc::new(Keypair::new());
    let set = InstructionSet::new(vec![cosigned_instruction(tag, &cosigner.pubkey())])
        .with_signer(cosigner.clone());
    (set, cosigner)
}

/// Test fixture wiring mocks, config and an event log into a sender
pub struct TestFixture {
    pub network: Arc<MockNetwork>,
    pub signer: Arc<MockSigner>,
    pub events: EventLog,
    pub config: SenderConfig,
}

impl TestFixture {
    pub fn new(network: MockNetwork) -> Self {
        Self::with_signer(network, MockSigner::new(Keypair::new()))
    }

    pub fn with_signer(network: MockNetwork, signer: MockSigner) -> Self {
        Self {
            network: Arc::new(network),
            signer: Arc::new(signer),
            events: EventLog::default(),
            config: SenderConfig::default(),
        }
    }

    pub fn abort_on_failure(mut self, abort_on_failure: bool) -> Self {
        self.config.abort_on_failure = abort_on_failure;
        self
    }

    pub fn max_signing_attempts(mut self, max_signing_attempts: usize) -> Self {
        self.config.max_signing_attempts = max_signing_attempts;
        self
    }

    /// A sender over this fixture's mocks with every callback recorded
    pub fn sender(
        &self,
        instruction_sets: Vec<InstructionSet>,
    ) -> SmartSender<Arc<MockNetwork>, Arc<MockSigner>> {
        let sender = SmartSender::new(self.network.clone(), self.signer.clone())
            .with_config(self.config.clone())
            .with_instruction_sets(instruction_sets);
        self.events.attach(sender)
    }
}
