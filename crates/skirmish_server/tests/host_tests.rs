//! Hosted matches with scripted agents.

use std::time::Duration;

use skirmish_core::components::Owner;
use skirmish_core::config::MatchConfig;
use skirmish_core::protocol::Command;
use skirmish_core::victory::VictoryReason;
use skirmish_server::agent::{spawn_agent, Strategy};
use skirmish_server::host::{MatchHost, MatchStatus};
use skirmish_server::registry::MatchRegistry;
use skirmish_test_utils::fixtures::test_config;

const FRAME: Duration = Duration::from_millis(10);

fn short_setup() -> MatchConfig {
    MatchConfig {
        speed: 32,
        setup_phase_ticks: 30,
        ..test_config()
    }
}

#[tokio::test(start_paused = true)]
async fn rush_beats_passive_by_elimination() {
    let (host, handle) = MatchHost::new(short_setup());
    let red = spawn_agent(&handle, Owner::Red, Strategy::Rush.agent());
    let blue = spawn_agent(&handle, Owner::Blue, Strategy::Passive.agent());

    let report = host.run(FRAME).await;
    red.await.unwrap();
    blue.await.unwrap();

    assert_eq!(report.winner, Some(Owner::Red));
    assert_eq!(report.reason, Some(VictoryReason::Elimination));
    assert_eq!(report.ticks, 31);
    assert!(report.red.total_units > 0);
    assert_eq!(report.blue.total_units, 0);
    assert!(matches!(handle.status(), MatchStatus::Finished(Some(_))));
}

#[tokio::test(start_paused = true)]
async fn agents_stop_when_battle_starts() {
    let (host, handle) = MatchHost::new(MatchConfig {
        setup_phase_ticks: 1000,
        ..short_setup()
    });
    let red = spawn_agent(&handle, Owner::Red, Strategy::Rush.agent());
    let blue = spawn_agent(&handle, Owner::Blue, Strategy::Rush.agent());
    let running = host.spawn(FRAME);

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.start_battle().await.unwrap();
    red.await.unwrap();
    blue.await.unwrap();
    assert_eq!(handle.status(), MatchStatus::Battle);

    // Commands sent during the battle are accepted by the inbox and dropped.
    handle.send(Owner::Red, Command::BuyUnit).await.unwrap();

    let report = running.await.unwrap();
    assert!(report.winner.is_some());
    assert!(report.blue.total_units > 0);
    assert!(report.red.total_units > 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_leaves_match_undecided() {
    let registry = MatchRegistry::new();
    let (host, handle) = registry.create(short_setup()).await;
    let mut snapshots = handle.subscribe();
    let running = host.spawn(FRAME);

    let first = snapshots.recv().await.unwrap();
    assert_eq!(first.match_id, handle.match_id());
    assert_eq!(first.owner, Owner::Blue);

    registry.shutdown_all().await;
    let report = running.await.unwrap();
    assert_eq!(report.winner, None);
    assert!(report.ticks < 30);
    assert_eq!(handle.status(), MatchStatus::Finished(None));

    registry.remove(handle.match_id()).await;
    assert!(registry.is_empty().await);
}
