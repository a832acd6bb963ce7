use smart_sender::{BatchSigner, DeliveryError, Network, SmartSender};
use solana_sdk::signature::Signature;
use std::sync::{Arc, Mutex};

/// A callback invocation, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Progress {
        index: usize,
        signature: Signature,
    },
    ReSign {
        attempt: usize,
        index: usize,
    },
    Failure {
        index: usize,
        original_index: usize,
        successful_items: usize,
        instruction_count: usize,
        max_attempts_reached: bool,
        error: String,
    },
}

/// Shared record of every callback a sender fired
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn attach<N: Network, S: BatchSigner>(
        &self,
        sender: SmartSender<N, S>,
    ) -> SmartSender<N, S> {
        let progress = self.events.clone();
        let resign = self.events.clone();
        let failure = self.events.clone();

        sender
            .on_progress(move |index, signature| {
                progress.lock().unwrap().push(Event::Progress {
                    index,
                    signature: *signature,
                });
            })
            .on_resign(move |attempt, index| {
                resign
                    .lock()
                    .unwrap()
                    .push(Event::ReSign { attempt, index });
            })
            .on_failure(move |event| {
                failure.lock().unwrap().push(Event::Failure {
                    index: event.index,
                    original_index: event.original_index,
                    successful_items: event.successful_items,
                    instruction_count: event.instruction_set.instructions.len(),
                    max_attempts_reached: matches!(
                        event.error,
                        DeliveryError::MaxResignAttemptsReached { .. }
                    ),
                    error: event.error.to_string(),
                });
            })
    }

    pub fn all(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Batch indices reported through the progress callback, in order
    pub fn progress_indices(&self) -> Vec<usize> {
        self.all()
            .into_iter()
            .filter_map(|event| match event {
                Event::Progress { index, .. } => Some(index),
                _ => None,
            })
            .collect()
    }

    /// `(attempt, index)` of every re-sign callback, in order
    pub fn resigns(&self) -> Vec<(usize, usize)> {
        self.all()
            .into_iter()
            .filter_map(|event| match event {
                Event::ReSign { attempt, index } => Some((attempt, index)),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<Event> {
        self.all()
            .into_iter()
            .filter(|event| matches!(event, Event::Failure { .. }))
            .collect()
    }
}
