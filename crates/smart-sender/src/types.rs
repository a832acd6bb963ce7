use solana_sdk::{
    clock::Slot,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::Transaction,
};
use std::{fmt, sync::Arc};

/// Number of slots after a window's reference slot at which the window is
/// treated as exhausted.
pub const EXPIRY_MARGIN: Slot = 150;

/// One caller-defined unit of work: becomes exactly one transaction.
#[derive(Clone, Default)]
pub struct InstructionSet {
    pub instructions: Vec<Instruction>,
    /// Co-signers required by `instructions`, besides the fee payer
    pub signers: Vec<Arc<dyn Signer + Send + Sync>>,
}

impl InstructionSet {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: Vec::new(),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer + Send + Sync>) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn signer_pubkeys(&self) -> Vec<Pubkey> {
        self.signers.iter().map(|signer| signer.pubkey()).collect()
    }
}

impl fmt::Debug for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionSet")
            .field("instructions", &self.instructions)
            .field("signers", &self.signer_pubkeys())
            .finish()
    }
}

/// Blockhash material fetched from the network at one point in time,
/// together with the slot observed alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub slot: Slot,
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

impl ValidityWindow {
    pub fn expires_at(&self) -> Slot {
        self.slot.saturating_add(EXPIRY_MARGIN)
    }

    pub fn is_exhausted_at(&self, slot: Slot) -> bool {
        slot >= self.expires_at()
    }
}

/// A confirmed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub signature: Signature,
    pub slot: Slot,
}

/// Fully signed transactions, one per non-empty instruction set, in input order.
///
/// `origin[i]` is the position of the instruction set that produced
/// `transactions[i]` in the caller's (unfiltered) list.
#[derive(Debug, Clone, Default)]
pub struct SignedBatch {
    transactions: Vec<Transaction>,
    origin: Vec<usize>,
}

impl SignedBatch {
    pub(crate) fn new(transactions: Vec<Transaction>, origin: Vec<usize>) -> Self {
        debug_assert_eq!(transactions.len(), origin.len());
        Self {
            transactions,
            origin,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    pub fn origin_index(&self, index: usize) -> Option<usize> {
        self.origin.get(index).copied()
    }

    /// Replace everything from `start` on with `suffix`. Entries before
    /// `start` are left untouched.
    pub(crate) fn replace_suffix(&mut self, start: usize, suffix: Vec<Transaction>) {
        debug_assert_eq!(start + suffix.len(), self.transactions.len());
        self.transactions.truncate(start);
        self.transactions.extend(suffix);
    }
}

/// Mutable state of one `send` call
#[derive(Debug)]
pub struct DeliveryState {
    pub window: ValidityWindow,
    pub batch: SignedBatch,
    pub successful_items: usize,
    pub cursor: usize,
    /// Error raised while refreshing the window after the item at `cursor - 1`
    /// confirmed; charged to the item at `cursor`.
    pub(crate) pending_error: Option<crate::DeliveryError>,
}

impl DeliveryState {
    pub fn new(window: ValidityWindow, batch: SignedBatch) -> Self {
        Self {
            window,
            batch,
            successful_items: 0,
            cursor: 0,
            pending_error: None,
        }
    }

    pub fn has_items_after(&self, index: usize) -> bool {
        index + 1 < self.batch.len()
    }
}
