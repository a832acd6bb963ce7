use crate::{
    builder, BatchSigner, DeliveryError, DeliveryState, InstructionSet, Network, SenderConfig,
    SenderError, SenderResult, SignedBatch, ValidityWindow,
};
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};
use tracing::{debug, info, warn};

/// Called once per confirmed item with its batch index and signature
pub type ProgressCallback = Box<dyn FnMut(usize, &Signature) + Send + Sync>;

/// Called before the unsent suffix is rebuilt, with the attempt number and
/// the batch index the rebuild starts at. Attempt 0 is a proactive rebuild
/// after the window ran out under a confirmed item.
pub type ReSignCallback = Box<dyn FnMut(usize, usize) + Send + Sync>;

/// Called once per item that could not be delivered
pub type FailureCallback = Box<dyn FnMut(&FailureEvent<'_>) + Send + Sync>;

/// Everything known about an item that failed for good
#[derive(Debug)]
pub struct FailureEvent<'a> {
    pub error: &'a DeliveryError,
    /// Position in the submitted batch
    pub index: usize,
    /// Position in the caller's instruction set list
    pub original_index: usize,
    /// Items confirmed before this failure
    pub successful_items: usize,
    pub instruction_set: &'a InstructionSet,
}

#[derive(Debug)]
pub struct FailedItem {
    pub index: usize,
    pub original_index: usize,
    pub error: DeliveryError,
}

/// Outcome of one `send` call
#[derive(Debug, Default)]
pub struct DeliverySummary {
    /// Number of transactions in the batch (empty sets excluded)
    pub total_items: usize,
    /// Instruction sets dropped for having no instructions
    pub skipped_empty_sets: usize,
    pub successful_items: usize,
    /// Batch index and signature of each confirmed item, in order
    pub signatures: Vec<(usize, Signature)>,
    pub failures: Vec<FailedItem>,
    /// Processing stopped early because of `abort_on_failure`
    pub aborted: bool,
}

impl DeliverySummary {
    pub fn is_complete(&self) -> bool {
        self.successful_items == self.total_items
    }
}

/// Attempts made on the item under the cursor
#[derive(Debug, Default)]
struct ItemAttempts {
    count: usize,
}

/// Delivers an ordered batch of instruction sets, one transaction at a time.
///
/// A sender is configured once and consumed by [`SmartSender::send`].
pub struct SmartSender<N, S> {
    network: N,
    signer: S,
    config: SenderConfig,
    instruction_sets: Vec<InstructionSet>,
    on_progress: Option<ProgressCallback>,
    on_resign: Option<ReSignCallback>,
    on_failure: Option<FailureCallback>,
}

impl<N: Network, S: BatchSigner> SmartSender<N, S> {
    pub fn new(network: N, signer: S) -> Self {
        Self {
            network,
            signer,
            config: SenderConfig::default(),
            instruction_sets: Vec::new(),
            on_progress: None,
            on_resign: None,
            on_failure: None,
        }
    }

    pub fn with_config(mut self, config: SenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_instruction_sets(mut self, instruction_sets: Vec<InstructionSet>) -> Self {
        self.instruction_sets = instruction_sets;
        self
    }

    pub fn on_progress(
        mut self,
        callback: impl FnMut(usize, &Signature) + Send + Sync + 'static,
    ) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_resign(
        mut self,
        callback: impl FnMut(usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_resign = Some(Box::new(callback));
        self
    }

    pub fn on_failure(
        mut self,
        callback: impl FnMut(&FailureEvent<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Sign and deliver every instruction set, in order.
    ///
    /// Only precondition and initial preparation failures are returned as
    /// errors. Item failures go to the failure callback and the summary.
    pub async fn send(mut self) -> SenderResult<DeliverySummary> {
        let fee_payer = self.signer.pubkey().ok_or(SenderError::SignerNotConnected)?;
        if self.instruction_sets.is_empty() {
            return Err(SenderError::NoInstructionSets);
        }
        self.config.validate()?;

        let origin = builder::non_empty_positions(&self.instruction_sets);
        let mut summary = DeliverySummary {
            total_items: origin.len(),
            skipped_empty_sets: self.instruction_sets.len() - origin.len(),
            ..Default::default()
        };

        if origin.is_empty() {
            warn!(
                "All {} instruction sets are empty, nothing to send",
                self.instruction_sets.len()
            );
            return Ok(summary);
        }

        let window = self
            .network
            .validity_window(self.config.commitment_config())
            .await
            .map_err(SenderError::Preparation)?;
        let batch = self
            .build_signed_batch(&fee_payer, origin, &window)
            .await
            .map_err(SenderError::Preparation)?;

        info!(
            "Sending {} transactions (window slot {}, {} empty sets skipped)",
            batch.len(),
            window.slot,
            summary.skipped_empty_sets
        );

        let mut state = DeliveryState::new(window, batch);

        while state.cursor < state.batch.len() {
            let index = state.cursor;

            match self.process_item(&mut state, &fee_payer).await {
                Ok(signature) => summary.signatures.push((index, signature)),
                Err(error) => {
                    let original_index = self.report_failure(&state, index, &error);
                    summary.failures.push(FailedItem {
                        index,
                        original_index,
                        error,
                    });

                    if self.config.abort_on_failure {
                        summary.aborted = true;
                        break;
                    }
                }
            }

            state.cursor += 1;
        }

        summary.successful_items = state.successful_items;
        info!(
            "Delivered {} of {} transactions{}",
            summary.successful_items,
            summary.total_items,
            if summary.aborted { " (aborted)" } else { "" }
        );

        Ok(summary)
    }

    /// Build the initial batch from every non-empty set and sign it in one call
    async fn build_signed_batch(
        &self,
        fee_payer: &Pubkey,
        origin: Vec<usize>,
        window: &ValidityWindow,
    ) -> Result<SignedBatch, DeliveryError> {
        let unsigned = builder::prepare_transactions(
            origin.iter().map(|&position| &self.instruction_sets[position]),
            fee_payer,
            window,
        )?;
        let signed = builder::sign_batch(&self.signer, unsigned).await?;

        Ok(SignedBatch::new(signed, origin))
    }

    /// Rebuild and re-sign the batch from `start` to the end against `window`.
    ///
    /// The state only moves to the new window once the signer has returned
    /// the whole suffix.
    async fn rebuild_from<'s>(
        &mut self,
        state: &'s mut DeliveryState,
        fee_payer: &Pubkey,
        start: usize,
        attempt: usize,
        window: ValidityWindow,
    ) -> Result<&'s Transaction, DeliveryError> {
        if let Some(on_resign) = self.on_resign.as_mut() {
            on_resign(attempt, start);
        }

        let origin = &state.batch.origin()[start..];
        let unsigned = builder::prepare_transactions(
            origin.iter().map(|&position| &self.instruction_sets[position]),
            fee_payer,
            &window,
        )?;
        let signed = builder::sign_batch(&self.signer, unsigned).await?;

        state.batch.replace_suffix(start, signed);
        state.window = window;

        info!(
            "Rebuilt {} transactions from index {} against window slot {}",
            state.batch.len() - start,
            start,
            window.slot
        );

        state
            .batch
            .get(start)
            .ok_or_else(|| DeliveryError::Other(format!("No transaction at index {start}")))
    }

    /// Run the item under the cursor until it confirms or fails for good
    async fn process_item(
        &mut self,
        state: &mut DeliveryState,
        fee_payer: &Pubkey,
    ) -> Result<Signature, DeliveryError> {
        let index = state.cursor;
        let mut attempts = ItemAttempts::default();

        loop {
            let result = match state.pending_error.take() {
                Some(error) => Err(error),
                None => self.deliver_item(state, fee_payer).await,
            };

            let error = match result {
                Ok(signature) => return Ok(signature),
                Err(error) => error,
            };

            attempts.count += 1;
            warn!(
                "Transaction {} attempt {} failed: {}",
                index, attempts.count, error
            );

            if !error.is_timeout() {
                return Err(error);
            }
            if attempts.count >= self.config.max_signing_attempts {
                return Err(DeliveryError::MaxResignAttemptsReached {
                    attempts: attempts.count,
                });
            }

            self.refresh_if_expired(state, fee_payer, index, attempts.count)
                .await?;
        }
    }

    /// Submit the item under the cursor once. On success, refresh the window
    /// for the remaining items if it ran out under this one.
    async fn deliver_item(
        &mut self,
        state: &mut DeliveryState,
        fee_payer: &Pubkey,
    ) -> Result<Signature, DeliveryError> {
        let index = state.cursor;
        let transaction = state
            .batch
            .get(index)
            .ok_or_else(|| DeliveryError::Other(format!("No transaction at index {index}")))?;

        let confirmation = self.network.send_and_confirm(transaction).await?;

        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(index, &confirmation.signature);
        }
        state.successful_items += 1;
        debug!(
            "Transaction {} confirmed at slot {}: {}",
            index, confirmation.slot, confirmation.signature
        );

        if state.window.is_exhausted_at(confirmation.slot) && state.has_items_after(index) {
            info!(
                "Validity window from slot {} exhausted at slot {}, rebuilding from index {}",
                state.window.slot,
                confirmation.slot,
                index + 1
            );
            if let Err(error) = self.refresh_from(state, fee_payer, index + 1, 0).await {
                warn!("Failed to refresh validity window: {}", error);
                state.pending_error = Some(error);
            }
        }

        Ok(confirmation.signature)
    }

    /// After a timeout: rebuild from `index` only if the current slot shows
    /// the window has run out, otherwise resubmit the same transaction.
    async fn refresh_if_expired(
        &mut self,
        state: &mut DeliveryState,
        fee_payer: &Pubkey,
        index: usize,
        attempt: usize,
    ) -> Result<(), DeliveryError> {
        let slot = self
            .network
            .get_slot(self.config.commitment_config())
            .await?;

        if !state.window.is_exhausted_at(slot) {
            debug!(
                "Window from slot {} still valid at slot {}, resubmitting {}",
                state.window.slot, slot, index
            );
            return Ok(());
        }

        self.refresh_from(state, fee_payer, index, attempt).await
    }

    async fn refresh_from(
        &mut self,
        state: &mut DeliveryState,
        fee_payer: &Pubkey,
        start: usize,
        attempt: usize,
    ) -> Result<(), DeliveryError> {
        let window = self
            .network
            .validity_window(self.config.commitment_config())
            .await?;
        let transaction = self
            .rebuild_from(state, fee_payer, start, attempt, window)
            .await?;

        if let Some(signature) = transaction.signatures.first() {
            debug!("Resuming at index {} with {}", start, signature);
        }
        Ok(())
    }

    /// Hand a terminal item failure to the failure callback. Returns the
    /// caller's index of the failed set.
    fn report_failure(
        &mut self,
        state: &DeliveryState,
        index: usize,
        error: &DeliveryError,
    ) -> usize {
        let original_index = state.batch.origin_index(index).unwrap_or(index);
        warn!(
            "Transaction {} (instruction set {}) failed after {} successful: {}",
            index, original_index, state.successful_items, error
        );

        if let Some(on_failure) = self.on_failure.as_mut() {
            let event = FailureEvent {
                error,
                index,
                original_index,
                successful_items: state.successful_items,
                instruction_set: &self.instruction_sets[original_index],
            };
            on_failure(&event);
        }

        original_index
    }
}
