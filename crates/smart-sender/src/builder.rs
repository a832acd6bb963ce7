/*!
# Batch Builder

Turns instruction sets into transactions bound to one [`ValidityWindow`],
partially signed by each set's own co-signers, and hands the whole batch to
the [`BatchSigner`] in a single call.

Nothing here touches the network.
*/

use crate::{BatchSigner, InstructionSet, SignerError, ValidityWindow};
use solana_sdk::{message::Message, pubkey::Pubkey, signer::Signer, transaction::Transaction};

/// Positions of the instruction sets that carry at least one instruction.
///
/// Empty sets never become transactions, so this is also the mapping from
/// batch position back to the caller's index.
pub fn non_empty_positions(instruction_sets: &[InstructionSet]) -> Vec<usize> {
    instruction_sets
        .iter()
        .enumerate()
        .filter(|(_, set)| !set.is_empty())
        .map(|(position, _)| position)
        .collect()
}

/// Build one transaction paid for by `fee_payer` and partially signed by the
/// set's co-signers
pub fn prepare_transaction(
    instruction_set: &InstructionSet,
    fee_payer: &Pubkey,
    window: &ValidityWindow,
) -> Result<Transaction, SignerError> {
    let message = Message::new_with_blockhash(
        &instruction_set.instructions,
        Some(fee_payer),
        &window.blockhash,
    );
    let mut transaction = Transaction::new_unsigned(message);

    if !instruction_set.signers.is_empty() {
        let signers: Vec<&dyn Signer> = instruction_set
            .signers
            .iter()
            .map(|signer| signer.as_ref() as &dyn Signer)
            .collect();
        transaction.try_partial_sign(&signers, window.blockhash)?;
    }

    Ok(transaction)
}

/// Prepare every set in `instruction_sets` against `window`, in order
pub fn prepare_transactions<'a>(
    instruction_sets: impl IntoIterator<Item = &'a InstructionSet>,
    fee_payer: &Pubkey,
    window: &ValidityWindow,
) -> Result<Vec<Transaction>, SignerError> {
    instruction_sets
        .into_iter()
        .map(|set| prepare_transaction(set, fee_payer, window))
        .collect()
}

/// Hand the whole batch to the signer. A reply of the wrong length fails the
/// batch as a whole.
pub async fn sign_batch<S: BatchSigner + ?Sized>(
    signer: &S,
    unsigned: Vec<Transaction>,
) -> Result<Vec<Transaction>, SignerError> {
    let expected = unsigned.len();
    let signed = signer.sign_all(unsigned).await?;

    if signed.len() != expected {
        return Err(SignerError::BatchLengthMismatch {
            expected,
            actual: signed.len(),
        });
    }

    Ok(signed)
}
