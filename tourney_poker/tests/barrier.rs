//! Spectator ack-barrier behavior against a live coordinator.

use std::time::Duration;

use tokio::sync::mpsc;

use tourney_poker::{AutoCaller, Coordinator, CoordinatorHandle, RankScorer, TourneyConfig};

fn config(min_spectators: usize, ack_timeout: Duration) -> TourneyConfig {
    TourneyConfig {
        seats: 2,
        min_spectators,
        tournaments: 1,
        starting_chips: 600,
        min_raise: 100,
        raise_rate: 1000,
        ack_timeout,
    }
}

async fn register_bots(handle: &CoordinatorHandle) {
    handle.register("a".to_string()).await.unwrap();
    handle.register("b".to_string()).await.unwrap();
}

/// A spectator task that reads its feed and acks every ping with the
/// checkpoint it carries. Returns the tags it saw, in order.
fn well_behaved_spectator(
    handle: CoordinatorHandle,
    mut feed: mpsc::Receiver<String>,
    id: u64,
) -> tokio::task::JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut tags = Vec::new();
        while let Some(line) = feed.recv().await {
            let value: serde_json::Value = serde_json::from_str(&line).unwrap();
            let tag = value["type"].as_str().unwrap().to_string();
            if tag == "PING" {
                let checkpoint = value["checkpoint"].as_u64().unwrap();
                handle.ack(id, checkpoint).await;
            }
            let done = tag == "SHUTDOWN";
            tags.push(tag);
            if done {
                break;
            }
        }
        tags
    })
}

#[tokio::test]
async fn acking_spectator_sees_the_whole_tournament() {
    let (coordinator, handle) = Coordinator::new(
        config(1, Duration::from_secs(5)),
        Box::new(AutoCaller),
        Box::new(RankScorer),
    );
    let running = tokio::spawn(coordinator.run());

    let (tx, rx) = mpsc::channel(64);
    let id = handle.attach_spectator(tx).await.unwrap();
    let spectator = well_behaved_spectator(handle.clone(), rx, id);
    register_bots(&handle).await;

    running.await.unwrap().unwrap();
    let tags = spectator.await.unwrap();
    assert_eq!(tags.first().map(String::as_str), Some("TOURNAMENT_START"));
    assert_eq!(tags.last().map(String::as_str), Some("SHUTDOWN"));
    assert!(tags.iter().any(|t| t == "PING"));
    assert!(tags.iter().any(|t| t == "TOURNAMENT_WINNER"));
    // One ping per hand, after its results.
    let pings = tags.iter().filter(|t| *t == "PING").count();
    let results = tags.iter().filter(|t| *t == "RESULTS").count();
    assert_eq!(pings, results);
}

#[tokio::test]
async fn silent_spectator_is_pruned_and_play_continues() {
    let (coordinator, handle) = Coordinator::new(
        config(1, Duration::from_millis(50)),
        Box::new(AutoCaller),
        Box::new(RankScorer),
    );
    let running = tokio::spawn(coordinator.run());

    // Attach a spectator that reads its feed but never acks.
    let (tx, mut rx) = mpsc::channel(64);
    handle.attach_spectator(tx).await.unwrap();
    let silent = tokio::spawn(async move { while rx.recv().await.is_some() {} });
    register_bots(&handle).await;

    // The barrier times the laggard out instead of stalling forever.
    running.await.unwrap().unwrap();
    silent.await.unwrap();
}

#[tokio::test]
async fn wrong_checkpoint_acks_never_release_the_barrier() {
    let (coordinator, handle) = Coordinator::new(
        config(1, Duration::from_millis(50)),
        Box::new(AutoCaller),
        Box::new(RankScorer),
    );
    let running = tokio::spawn(coordinator.run());

    let (tx, mut rx) = mpsc::channel(64);
    let id = handle.attach_spectator(tx).await.unwrap();
    let acker = handle.clone();
    let skewed = tokio::spawn(async move {
        let mut pings_seen = 0u32;
        while let Some(line) = rx.recv().await {
            let value: serde_json::Value = serde_json::from_str(&line).unwrap();
            if value["type"] == "PING" {
                pings_seen += 1;
                let checkpoint = value["checkpoint"].as_u64().unwrap();
                acker.ack(id, checkpoint + 1000).await;
            }
        }
        pings_seen
    });
    register_bots(&handle).await;

    running.await.unwrap().unwrap();
    // The skewed spectator was detached at the first barrier, so it
    // never saw a second ping.
    let pings_seen = skewed.await.unwrap();
    assert_eq!(pings_seen, 1);
}

#[tokio::test]
async fn ack_spam_does_not_push_back_the_barrier_deadline() {
    let (coordinator, handle) = Coordinator::new(
        config(1, Duration::from_millis(100)),
        Box::new(AutoCaller),
        Box::new(RankScorer),
    );
    let running = tokio::spawn(coordinator.run());

    // A spectator that never echoes the real checkpoint but floods the
    // intake with stale acks faster than the timeout ticks.
    let (tx, mut rx) = mpsc::channel(64);
    let id = handle.attach_spectator(tx).await.unwrap();
    let drain = tokio::spawn(async move { while rx.recv().await.is_some() {} });
    let acker = handle.clone();
    let spammer = tokio::spawn(async move {
        loop {
            acker.ack(id, 999_999).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });
    register_bots(&handle).await;

    // The deadline is fixed when the ping goes out, so the spam buys
    // the laggard nothing and play runs to completion.
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("stale ack spam stalled the barrier")
        .unwrap()
        .unwrap();
    spammer.abort();
    drain.await.unwrap();
}

#[tokio::test]
async fn spectators_can_attach_mid_tournament() {
    let (coordinator, handle) = Coordinator::new(
        config(1, Duration::from_secs(5)),
        Box::new(AutoCaller),
        Box::new(RankScorer),
    );
    let running = tokio::spawn(coordinator.run());

    let (tx, rx) = mpsc::channel(64);
    let id = handle.attach_spectator(tx).await.unwrap();
    let first = well_behaved_spectator(handle.clone(), rx, id);
    register_bots(&handle).await;

    // A second spectator joins while play is underway.
    let (tx2, rx2) = mpsc::channel(64);
    let id2 = handle.attach_spectator(tx2).await.unwrap();
    let second = well_behaved_spectator(handle.clone(), rx2, id2);

    running.await.unwrap().unwrap();
    let tags = first.await.unwrap();
    assert_eq!(tags.last().map(String::as_str), Some("SHUTDOWN"));
    // The late joiner still ends with the shutdown notice.
    let late_tags = second.await.unwrap();
    assert_eq!(late_tags.last().map(String::as_str), Some("SHUTDOWN"));
}
