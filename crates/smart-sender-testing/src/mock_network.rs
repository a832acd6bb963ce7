use async_trait::async_trait;
use smart_sender::{Confirmation, DeliveryError, Network, ValidityWindow, EXPIRY_MARGIN};
use solana_sdk::{
    clock::Slot,
    commitment_config::CommitmentConfig,
    hash::Hash,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use std::{collections::VecDeque, sync::Mutex};

/// What the mock does with the next submitted transaction
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Confirm at the given slot
    Confirm { slot: Slot },
    Timeout,
    /// Rejected by the runtime
    Reject(TransactionError),
    /// Transport failure
    Fail(String),
}

/// A transaction as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub signature: Signature,
    pub blockhash: Hash,
    pub fully_signed: bool,
    /// Data of each instruction, in order
    pub instruction_data: Vec<Vec<u8>>,
}

#[derive(Debug, Default)]
struct MockNetworkState {
    current_slot: Slot,
    outcomes: VecDeque<SendOutcome>,
    window_slots: VecDeque<Slot>,
    query_slots: VecDeque<Slot>,
    window_failures: VecDeque<Option<String>>,
    sent: Vec<SentTransaction>,
    windows: Vec<ValidityWindow>,
    slot_queries: usize,
}

/// Scripted, deterministic [`Network`].
///
/// Every queue falls back to `current_slot` (or to confirming at
/// `current_slot`) once it runs dry.
#[derive(Debug, Default)]
pub struct MockNetwork {
    state: Mutex<MockNetworkState>,
}

impl MockNetwork {
    pub fn new(current_slot: Slot) -> Self {
        Self {
            state: Mutex::new(MockNetworkState {
                current_slot,
                ..Default::default()
            }),
        }
    }

    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = SendOutcome>) -> Self {
        self.state.lock().unwrap().outcomes.extend(outcomes);
        self
    }

    /// Slots reported by successive validity window fetches
    pub fn with_window_slots(self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.state.lock().unwrap().window_slots.extend(slots);
        self
    }

    /// Slots reported by successive plain slot queries
    pub fn with_query_slots(self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.state.lock().unwrap().query_slots.extend(slots);
        self
    }

    /// Script successive window fetches: `None` succeeds, `Some(msg)` fails
    pub fn with_window_failures(
        self,
        failures: impl IntoIterator<Item = Option<String>>,
    ) -> Self {
        self.state.lock().unwrap().window_failures.extend(failures);
        self
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn windows(&self) -> Vec<ValidityWindow> {
        self.state.lock().unwrap().windows.clone()
    }

    pub fn window_fetches(&self) -> usize {
        self.state.lock().unwrap().windows.len()
    }

    pub fn slot_queries(&self) -> usize {
        self.state.lock().unwrap().slot_queries
    }

    /// Number of submissions of the given signature
    pub fn submissions_of(&self, signature: &Signature) -> usize {
        self.sent()
            .iter()
            .filter(|sent| sent.signature == *signature)
            .count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
    ) -> Result<Confirmation, DeliveryError> {
        let mut state = self.state.lock().unwrap();
        let signature = transaction.signatures.first().copied().unwrap_or_default();

        state.sent.push(SentTransaction {
            signature,
            blockhash: transaction.message.recent_blockhash,
            fully_signed: transaction.is_signed(),
            instruction_data: transaction
                .message
                .instructions
                .iter()
                .map(|ix| ix.data.clone())
                .collect(),
        });

        let current_slot = state.current_slot;
        match state
            .outcomes
            .pop_front()
            .unwrap_or(SendOutcome::Confirm { slot: current_slot })
        {
            SendOutcome::Confirm { slot } => Ok(Confirmation { signature, slot }),
            SendOutcome::Timeout => Err(DeliveryError::Timeout {
                signature: Some(signature),
            }),
            SendOutcome::Reject(error) => Err(DeliveryError::Transaction { signature, error }),
            SendOutcome::Fail(message) => Err(DeliveryError::Other(message)),
        }
    }

    async fn get_slot(&self, _commitment: CommitmentConfig) -> Result<Slot, DeliveryError> {
        let mut state = self.state.lock().unwrap();
        state.slot_queries += 1;
        let current_slot = state.current_slot;
        Ok(state.query_slots.pop_front().unwrap_or(current_slot))
    }

    async fn get_latest_blockhash(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), DeliveryError> {
        let current_slot = self.state.lock().unwrap().current_slot;
        Ok((Hash::new_unique(), current_slot + EXPIRY_MARGIN))
    }

    async fn validity_window(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<ValidityWindow, DeliveryError> {
        let mut state = self.state.lock().unwrap();

        if let Some(Some(message)) = state.window_failures.pop_front() {
            return Err(DeliveryError::Other(message));
        }

        let current_slot = state.current_slot;
        let slot = state.window_slots.pop_front().unwrap_or(current_slot);
        let window = ValidityWindow {
            slot,
            blockhash: Hash::new_unique(),
            last_valid_block_height: slot + EXPIRY_MARGIN,
        };
        state.windows.push(window);

        Ok(window)
    }
}
