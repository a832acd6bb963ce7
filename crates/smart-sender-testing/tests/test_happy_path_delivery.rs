use smart_sender_testing::{
    instruction_sets, Event, MockNetwork, SendOutcome, TestFixture, TEST_WINDOW_SLOT,
};

/// Test delivery of a batch that never comes close to the expiry threshold
///
/// **Test flow:**
/// 1. Four single-instruction sets, window at slot 1000, every item confirms
///    a few slots later
/// 2. Verify each progress callback fires exactly once, in index order
/// 3. Verify the batch was signed once and the window fetched once
#[tokio::test]
async fn test_happy_path_delivery() {
    let network = MockNetwork::new(TEST_WINDOW_SLOT).with_outcomes(
        (1..=4).map(|n| SendOutcome::Confirm {
            slot: TEST_WINDOW_SLOT + n,
        }),
    );
    let test = TestFixture::new(network);

    let summary = test.sender(instruction_sets(4)).send().await.unwrap();

    assert_eq!(test.events.progress_indices(), vec![0, 1, 2, 3]);
    assert!(test.events.resigns().is_empty());
    assert!(test.events.failures().is_empty());

    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.successful_items, 4);
    assert!(summary.is_complete());
    assert!(!summary.aborted);

    assert_eq!(test.signer.batch_sizes(), vec![4]);
    assert_eq!(test.network.window_fetches(), 1);
    assert_eq!(test.network.slot_queries(), 0);

    let sent = test.network.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|tx| tx.fully_signed));
    assert!(sent
        .iter()
        .all(|tx| tx.blockhash == test.network.windows()[0].blockhash));

    // Progress signatures line up with what went over the wire
    let signatures: Vec<_> = test
        .events
        .all()
        .into_iter()
        .filter_map(|event| match event {
            Event::Progress { signature, .. } => Some(signature),
            _ => None,
        })
        .collect();
    let sent_signatures: Vec<_> = sent.iter().map(|tx| tx.signature).collect();
    assert_eq!(signatures, sent_signatures);
    assert_eq!(
        summary.signatures,
        sent_signatures.into_iter().enumerate().collect::<Vec<_>>()
    );
}

/// Items are submitted strictly in input order
#[tokio::test]
async fn test_items_submitted_in_input_order() {
    let test = TestFixture::new(MockNetwork::new(TEST_WINDOW_SLOT));

    test.sender(instruction_sets(6)).send().await.unwrap();

    let tags: Vec<u8> = test
        .network
        .sent()
        .iter()
        .map(|tx| tx.instruction_data[0][0])
        .collect();
    assert_eq!(tags, vec![0, 1, 2, 3, 4, 5]);
}
