//! Broadcast integration tests
//!
//! Observers of a live session: ordering under concurrent submitters, no
//! replay for late subscribers, and pruning of dropped receivers.

use std::sync::Arc;
use std::time::Duration;

use hexwar::actions::ActionKind;
use hexwar::core::config::{ActorConfig, SimulationConfig};
use hexwar::core::types::{ActorId, RegionId, Sequence};
use hexwar::data::BuiltinSeed;
use hexwar::events::{StateChange, UpdateKind};
use hexwar::session::Session;

fn session_with_actors(count: usize) -> Session {
    let config = SimulationConfig {
        seed: Some(5),
        actors: (0..count)
            .map(|i| ActorConfig {
                id: ActorId::new(format!("p{}", i)),
                faction: "tu".to_string(),
                starting_energy: 100,
            })
            .collect(),
        ..SimulationConfig::default()
    };
    Session::bootstrap(config, &BuiltinSeed).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_preserve_order() {
    let session = Arc::new(session_with_actors(8));
    let mut first = session.subscribe();
    let mut second = session.subscribe();

    let mut handles = Vec::new();
    for i in 0..8 {
        let session = Arc::clone(&session);
        handles.push(tokio::spawn(async move {
            let actor = ActorId::new(format!("p{}", i));
            let mut accepted = 0;
            for _ in 0..10 {
                if session
                    .submit_action(&actor, ActionKind::Attack, &RegionId::new("ku"))
                    .is_ok()
                {
                    accepted += 1;
                }
                tokio::task::yield_now().await;
            }
            accepted
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        accepted += handle.await.unwrap();
    }
    // 100 energy at 10 per action
    assert_eq!(accepted, 80);

    let first: Vec<Sequence> = first.drain().iter().map(|e| e.sequence).collect();
    let second: Vec<Sequence> = second.drain().iter().map(|e| e.sequence).collect();
    let expected: Vec<Sequence> = (1..=80).collect();
    assert_eq!(first, expected);
    assert_eq!(second, expected);
}

#[tokio::test]
async fn test_health_in_events_is_monotonic_for_attacks() {
    let session = session_with_actors(1);
    let mut observer = session.subscribe();
    let actor = ActorId::new("p0");
    for _ in 0..5 {
        session
            .submit_action(&actor, ActionKind::Attack, &RegionId::new("mu"))
            .unwrap();
    }

    let healths: Vec<u32> = observer
        .drain()
        .iter()
        .filter_map(|e| match e.change {
            StateChange::RegionHealth { new_health, .. } => Some(new_health),
            _ => None,
        })
        .collect();
    assert_eq!(healths.len(), 5);
    assert!(healths.windows(2).all(|w| w[1] < w[0]));
    assert_eq!(session.snapshot().region(&RegionId::new("mu")).unwrap().health, healths[4]);
}

#[tokio::test]
async fn test_late_subscriber_sees_only_new_events() {
    let session = session_with_actors(1);
    let actor = ActorId::new("p0");
    session
        .submit_action(&actor, ActionKind::Attack, &RegionId::new("cu"))
        .unwrap();

    let mut late = session.subscribe();
    assert!(late.try_recv().is_none());

    session
        .submit_action(&actor, ActionKind::Attack, &RegionId::new("cu"))
        .unwrap();
    let events = late.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sequence, 2);
}

#[tokio::test]
async fn test_dropped_observer_is_pruned() {
    let session = session_with_actors(1);
    let mut keep = session.subscribe();
    let gone = session.subscribe();
    assert_eq!(session.broadcaster().observer_count(), 2);
    drop(gone);

    session
        .submit_action(&ActorId::new("p0"), ActionKind::Attack, &RegionId::new("cu"))
        .unwrap();
    assert_eq!(session.broadcaster().observer_count(), 1);
    assert_eq!(keep.drain().len(), 1);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let session = session_with_actors(1);
    let mut observer = session.subscribe();
    assert!(session.unsubscribe(observer.id()));

    session
        .submit_action(&ActorId::new("p0"), ActionKind::Attack, &RegionId::new("cu"))
        .unwrap();
    assert!(observer.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_session_clock_feeds_observers() {
    let mut session = session_with_actors(1);
    let mut observer = session.subscribe();
    session.start();
    assert!(session.is_running());

    tokio::time::sleep(Duration::from_secs(10)).await;
    session.shutdown().await;

    let events = observer.drain();
    assert!(events.iter().any(|e| e.kind == UpdateKind::Skirmish));
    for pair in events.windows(2) {
        assert!(pair[0].sequence < pair[1].sequence);
    }
}
