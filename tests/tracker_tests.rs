mod support;

use std::sync::Arc;

use herald::app::{Cursor, Tracker, TrackingMessage};

use support::chain::{block_hash, MockChain};

fn included_heights(messages: &[TrackingMessage]) -> Vec<u64> {
    messages
        .iter()
        .filter_map(|m| match m {
            TrackingMessage::Include(info) => Some(info.height),
            TrackingMessage::Rollback { .. } => None,
        })
        .collect()
}

fn rolled_back_heights(messages: &[TrackingMessage]) -> Vec<u64> {
    messages
        .iter()
        .filter_map(|m| match m {
            TrackingMessage::Rollback { height, .. } => Some(*height),
            TrackingMessage::Include(_) => None,
        })
        .collect()
}

fn tracker(chain: &Arc<MockChain>, start_height: Option<u64>, max_catch_up: u64) -> Tracker {
    Tracker::new(chain.clone(), start_height, max_catch_up)
}

#[tokio::test]
async fn first_poll_anchors_at_tip_without_announcing() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);

    let messages = tracker.poll().await.unwrap();

    assert!(messages.is_empty());
    assert_eq!(
        tracker.cursor(),
        Some(&Cursor {
            height: 100,
            hash: block_hash(0, 100)
        })
    );
}

#[tokio::test]
async fn new_blocks_are_included_in_order() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();

    chain.extend_to(103, 0);
    let messages = tracker.poll().await.unwrap();

    assert_eq!(included_heights(&messages), vec![101, 102, 103]);
    assert_eq!(tracker.cursor().unwrap().height, 103);

    assert!(tracker.poll().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_height_announces_from_that_block() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, Some(98), 10);

    let messages = tracker.poll().await.unwrap();

    assert_eq!(included_heights(&messages), vec![98, 99, 100]);
}

#[tokio::test]
async fn start_height_above_tip_falls_back_to_tip() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, Some(500), 10);

    assert!(tracker.poll().await.unwrap().is_empty());
    assert_eq!(tracker.cursor().unwrap().height, 100);
}

#[tokio::test]
async fn resumed_cursor_continues_after_saved_block() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10).resume_from(Cursor {
        height: 97,
        hash: block_hash(0, 97),
    });

    let messages = tracker.poll().await.unwrap();

    assert_eq!(included_heights(&messages), vec![98, 99, 100]);
}

#[tokio::test]
async fn far_behind_skips_ahead_to_catch_up_window() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 3).resume_from(Cursor {
        height: 50,
        hash: block_hash(0, 50),
    });

    let messages = tracker.poll().await.unwrap();

    assert_eq!(included_heights(&messages), vec![98, 99, 100]);
}

#[tokio::test]
async fn replaced_tip_is_rolled_back_and_new_branch_included() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();

    // Block 100 is replaced and the new branch grows to 102.
    chain.reorg(100, 102, 1);
    let messages = tracker.poll().await.unwrap();

    assert_eq!(
        messages[0],
        TrackingMessage::Rollback {
            height: 100,
            hash: block_hash(0, 100)
        }
    );
    assert_eq!(included_heights(&messages), vec![100, 101, 102]);
    assert_eq!(tracker.cursor().unwrap().hash, block_hash(1, 102));
}

#[tokio::test]
async fn deeper_reorg_rolls_back_each_announced_block() {
    let chain = Arc::new(MockChain::with_tip(98));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();
    chain.extend_to(100, 0);
    assert_eq!(included_heights(&tracker.poll().await.unwrap()), vec![99, 100]);

    // Blocks 99 and 100 are both replaced.
    chain.reorg(99, 101, 2);
    let messages = tracker.poll().await.unwrap();

    assert_eq!(rolled_back_heights(&messages), vec![100, 99]);
    assert_eq!(included_heights(&messages), vec![99, 100, 101]);
    assert_eq!(tracker.cursor().unwrap().hash, block_hash(2, 101));
}

#[tokio::test]
async fn tip_at_cursor_height_with_other_hash_rewinds_below_tip() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();

    chain.reorg(100, 100, 3);
    let messages = tracker.poll().await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0],
        TrackingMessage::Rollback {
            height: 100,
            hash: block_hash(0, 100)
        }
    );
    assert!(matches!(
        &messages[1],
        TrackingMessage::Include(info) if info.hash == block_hash(3, 100)
    ));
    assert_eq!(tracker.cursor().unwrap().hash, block_hash(3, 100));
}

#[tokio::test]
async fn chain_shrinking_onto_announced_block_keeps_it() {
    let chain = Arc::new(MockChain::with_tip(98));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();
    chain.extend_to(100, 0);
    tracker.poll().await.unwrap();

    // Block 100 disappears; 99 is still the one we announced.
    chain.reorg(100, 99, 5);
    let messages = tracker.poll().await.unwrap();

    assert_eq!(rolled_back_heights(&messages), vec![100]);
    assert!(included_heights(&messages).is_empty());
    assert_eq!(tracker.cursor().unwrap().hash, block_hash(0, 99));
}

#[tokio::test]
async fn shorter_chain_rolls_back_to_new_tip() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();

    chain.reorg(99, 99, 4);
    let messages = tracker.poll().await.unwrap();

    assert!(matches!(
        messages[0],
        TrackingMessage::Rollback { height: 100, .. }
    ));
    assert_eq!(included_heights(&messages), vec![99]);
    assert_eq!(tracker.cursor().unwrap().hash, block_hash(4, 99));
}

#[tokio::test]
async fn indexer_outage_is_an_error_and_cursor_stays() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();

    chain.extend_to(102, 0);
    chain.set_offline(true);
    assert!(tracker.poll().await.is_err());
    assert_eq!(tracker.cursor().unwrap().height, 100);

    chain.set_offline(false);
    let messages = tracker.poll().await.unwrap();
    assert_eq!(included_heights(&messages), vec![101, 102]);
}

#[tokio::test]
async fn failure_partway_keeps_blocks_already_walked() {
    let chain = Arc::new(MockChain::with_tip(100));
    let mut tracker = tracker(&chain, None, 10);
    tracker.poll().await.unwrap();

    chain.extend_to(103, 0);
    chain.fail_header(102, true);
    let messages = tracker.poll().await.unwrap();
    assert_eq!(included_heights(&messages), vec![101]);
    assert_eq!(tracker.cursor().unwrap().height, 101);
    assert_eq!(tracker.cursor().unwrap().hash, chain.hash_at(101));

    chain.fail_header(102, false);
    let messages = tracker.poll().await.unwrap();
    assert_eq!(included_heights(&messages), vec![102, 103]);
    assert!(rolled_back_heights(&messages).is_empty());
}
