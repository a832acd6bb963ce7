use smart_sender::DeliveryError;
use smart_sender_testing::{
    instruction_sets, Event, MockNetwork, SendOutcome, TestFixture, TEST_WINDOW_SLOT,
};
use solana_sdk::transaction::TransactionError;

/// Test that a rejected transaction is never resubmitted and aborts the batch
///
/// **Test flow:**
/// 1. Item 0 confirms, item 1 is rejected by the runtime
/// 2. Verify item 1 went over the wire exactly once
/// 3. Verify one failure event, reported with one successful item so far
/// 4. Verify no later item was submitted (abort_on_failure defaults to true)
#[tokio::test]
async fn test_transaction_error_aborts_batch() {
    let network = MockNetwork::new(TEST_WINDOW_SLOT).with_outcomes([
        SendOutcome::Confirm {
            slot: TEST_WINDOW_SLOT + 1,
        },
        SendOutcome::Reject(TransactionError::AccountInUse),
    ]);
    let test = TestFixture::new(network);

    let summary = test.sender(instruction_sets(4)).send().await.unwrap();

    let sent = test.network.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(test.network.submissions_of(&sent[1].signature), 1);
    assert_eq!(test.network.slot_queries(), 0);

    assert_eq!(test.events.progress_indices(), vec![0]);
    let failures = test.events.failures();
    assert_eq!(failures.len(), 1);
    match &failures[0] {
        Event::Failure {
            index,
            original_index,
            successful_items,
            max_attempts_reached,
            ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(*original_index, 1);
            assert_eq!(*successful_items, 1);
            assert!(!max_attempts_reached);
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert!(summary.aborted);
    assert_eq!(summary.successful_items, 1);
    assert!(matches!(
        summary.failures[0].error,
        DeliveryError::Transaction {
            error: TransactionError::AccountInUse,
            ..
        }
    ));
}

/// With abort_on_failure disabled, later items still go out after a rejection
#[tokio::test]
async fn test_transaction_error_continues_when_not_aborting() {
    let network = MockNetwork::new(TEST_WINDOW_SLOT).with_outcomes([
        SendOutcome::Confirm {
            slot: TEST_WINDOW_SLOT + 1,
        },
        SendOutcome::Reject(TransactionError::InsufficientFundsForFee),
        SendOutcome::Confirm {
            slot: TEST_WINDOW_SLOT + 2,
        },
        SendOutcome::Confirm {
            slot: TEST_WINDOW_SLOT + 3,
        },
    ]);
    let test = TestFixture::new(network).abort_on_failure(false);

    let summary = test.sender(instruction_sets(4)).send().await.unwrap();

    assert_eq!(test.events.progress_indices(), vec![0, 2, 3]);
    assert_eq!(test.events.failures().len(), 1);
    assert_eq!(test.network.sent().len(), 4);

    assert!(!summary.aborted);
    assert_eq!(summary.successful_items, 3);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].index, 1);
    assert!(!summary.is_complete());
}

/// Transport failures are terminal too, regardless of the attempt budget
#[tokio::test]
async fn test_transport_error_not_retried() {
    let network = MockNetwork::new(TEST_WINDOW_SLOT)
        .with_outcomes([SendOutcome::Fail("connection reset".to_string())]);
    let test = TestFixture::new(network).max_signing_attempts(10);

    let summary = test.sender(instruction_sets(2)).send().await.unwrap();

    assert_eq!(test.network.sent().len(), 1);
    assert_eq!(test.signer.calls(), 1);
    assert!(test.events.resigns().is_empty());
    assert_eq!(test.events.failures().len(), 1);
    assert!(matches!(summary.failures[0].error, DeliveryError::Other(_)));
}
