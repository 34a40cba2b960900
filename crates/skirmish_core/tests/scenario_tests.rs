//! End-to-end match scenarios.

use std::time::Duration;

use skirmish_core::combat::{acquire_target, battle_step, CombatEvent};
use skirmish_core::components::{Owner, UnitKind, UnitState};
use skirmish_core::config::MatchConfig;
use skirmish_core::economy::Investment;
use skirmish_core::error::GameError;
use skirmish_core::game::Game;
use skirmish_core::math::Bounds;
use skirmish_core::protocol::{Command, PlayerCommand};
use skirmish_core::victory::VictoryReason;

use skirmish_test_utils::fixtures::{battle_with, duel, roster_of, test_config, FrameDriver};

#[test]
fn duel_resolves_in_two_hits() {
    let mut roster = roster_of(&[(Owner::Blue, 190, 20), (Owner::Red, 190, 380)]);
    let bounds = Bounds::square(400);
    let step = Duration::from_millis(40);
    let mut now = Duration::ZERO;
    let mut events = Vec::new();

    // Acquisition, then approach until both lock into combat.
    while !events.iter().any(|e| matches!(e, CombatEvent::Engaged { .. })) {
        now += step;
        events = battle_step(&mut roster, &bounds, now);
        assert!(now < Duration::from_secs(60), "units never met");
    }
    let (blue, red) = (roster.units()[0], roster.units()[1]);
    assert_eq!(blue.state, UnitState::Combat);
    assert_eq!(red.state, UnitState::Combat);
    assert_eq!(blue.target, Some(red.id));
    assert_eq!(red.target, Some(blue.id));
    assert_eq!(blue.position.x, 190);
    assert!((red.position.y - blue.position.y).abs() < 5);

    let mut attacks: Vec<CombatEvent> = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Attack { .. }))
        .copied()
        .collect();
    while roster.iter().all(|u| u.is_alive()) {
        now += step;
        attacks.extend(
            battle_step(&mut roster, &bounds, now)
                .into_iter()
                .filter(|e| matches!(e, CombatEvent::Attack { .. })),
        );
        assert!(now < Duration::from_secs(120), "nobody died");
    }

    assert!(attacks
        .iter()
        .all(|e| matches!(e, CombatEvent::Attack { damage: 5, .. })));
    let dead = roster.iter().find(|u| !u.is_alive()).copied().unwrap();
    let survivor = roster.iter().find(|u| u.is_alive()).copied().unwrap();
    assert_eq!(dead.hp, 0);
    assert_eq!(dead.state, UnitState::Dead);
    assert_eq!(survivor.hp, 5);
    let hits_on_dead = attacks
        .iter()
        .filter(|e| matches!(e, CombatEvent::Attack { target, .. } if *target == dead.id))
        .count();
    assert_eq!(hits_on_dead, 2);

    // The survivor drops its dead target and finds nobody left.
    now += step;
    battle_step(&mut roster, &bounds, now);
    let survivor_index = (survivor.id - 1) as usize;
    assert_eq!(roster.units()[survivor_index].state, UnitState::Idle);
    assert!(matches!(
        acquire_target(roster.units(), survivor_index),
        Err(GameError::NoEnemyFound)
    ));

    now += step;
    battle_step(&mut roster, &bounds, now);
    assert_eq!(roster.units()[survivor_index].state, UnitState::Idle);
}

#[test]
fn duel_match_ends_by_elimination() {
    let mut game = duel(test_config());
    let mut driver = FrameDriver::for_game(&game);

    let outcome = driver.drive_until_finished(&mut game, 2000).unwrap();
    assert_eq!(outcome.reason, VictoryReason::Elimination);
    // RED acts after BLUE on the engagement tick, so it strikes first.
    assert_eq!(outcome.winner, Owner::Red);
    assert_eq!(game.alive_units_of(Owner::Blue).count(), 0);
    assert_eq!(game.units_of(Owner::Blue).count(), 1);
}

#[test]
fn eleventh_purchase_is_refused() {
    let mut game = Game::new(test_config());
    for _ in 0..10 {
        game.purchase_unit(Owner::Blue, UnitKind::Soldier).unwrap();
    }
    assert_eq!(game.player(Owner::Blue).coins, 0);

    let err = game.purchase_unit(Owner::Blue, UnitKind::Soldier).unwrap_err();
    assert!(matches!(
        err,
        GameError::InsufficientFunds {
            required: 10,
            available: 0
        }
    ));
    assert_eq!(game.player(Owner::Blue).coins, 0);
    assert_eq!(game.units_of(Owner::Blue).count(), 10);

    let refused = game.apply_command(PlayerCommand::new(Owner::Blue, Command::BuyUnit));
    assert!(matches!(refused, Err(GameError::InsufficientFunds { .. })));
}

fn timeout_config() -> MatchConfig {
    MatchConfig {
        speed: 16,
        timeout_base_ticks: 5,
        ..test_config()
    }
}

#[test]
fn timeout_favours_larger_army() {
    let mut units = Vec::new();
    units.extend((0..3).map(|i| (Owner::Blue, 20 + i * 20, 0)));
    units.extend((0..5).map(|i| (Owner::Red, 20 + i * 20, 400)));
    let mut game = battle_with(timeout_config(), &units);
    let mut driver = FrameDriver::for_game(&game);

    let outcome = driver.drive_until_finished(&mut game, 10).unwrap();
    assert_eq!(outcome.winner, Owner::Red);
    assert_eq!(outcome.reason, VictoryReason::Timeout);
    assert_eq!(game.display_time(), 6);
}

#[test]
fn timeout_tie_goes_to_blue() {
    let mut units = Vec::new();
    units.extend((0..4).map(|i| (Owner::Blue, 20 + i * 20, 0)));
    units.extend((0..4).map(|i| (Owner::Red, 20 + i * 20, 400)));
    let mut game = battle_with(timeout_config(), &units);
    let mut driver = FrameDriver::for_game(&game);

    let outcome = driver.drive_until_finished(&mut game, 10).unwrap();
    assert_eq!(outcome.winner, Owner::Blue);
}

#[test]
fn economy_freezes_once_battle_starts() {
    let mut game = Game::new(test_config());
    let mut driver = FrameDriver::for_game(&game);
    game.purchase_unit(Owner::Blue, UnitKind::Soldier).unwrap();
    game.purchase_unit(Owner::Red, UnitKind::Soldier).unwrap();

    driver.drive_ticks(&mut game, 10);
    let blue_coins = game.player(Owner::Blue).coins;
    assert_eq!(blue_coins, 100);

    game.start_battle();
    for command in [Command::BuyUnit, Command::InvestMining, Command::InvestTech] {
        game.apply_command(PlayerCommand::new(Owner::Blue, command))
            .unwrap();
    }
    let events = driver.drive_ticks(&mut game, 10);
    assert!(events.iter().all(|e| e.snapshots.is_empty()));
    assert_eq!(game.player(Owner::Blue).coins, blue_coins);
    assert_eq!(game.player(Owner::Blue).mining_level, 1);
    assert_eq!(game.roster().len(), 2);
}

#[test]
fn setup_phase_ends_on_its_own() {
    let mut game = Game::new(MatchConfig {
        setup_phase_ticks: 20,
        ..test_config()
    });
    let mut driver = FrameDriver::for_game(&game);
    let events = driver.drive_ticks(&mut game, 21);

    let started: Vec<u64> = events
        .iter()
        .filter(|e| e.battle_started)
        .map(|e| e.tick)
        .collect();
    assert_eq!(started, vec![21]);
    assert_eq!(events[19].snapshots.len(), 2);
    assert!(events[20].snapshots.is_empty());
}

#[test]
fn upgrades_change_opponent_income() {
    let mut game = Game::new(MatchConfig {
        starting_coins: 1000,
        ..test_config()
    });
    let mut driver = FrameDriver::for_game(&game);

    assert_eq!(
        game.invest_mining(Owner::Blue).unwrap(),
        Investment::Upgraded { level: 2, cost: 50 }
    );
    assert_eq!(
        game.invest_mining(Owner::Blue).unwrap(),
        Investment::Upgraded {
            level: 3,
            cost: 100
        }
    );
    assert_eq!(game.invest_mining(Owner::Blue).unwrap(), Investment::MaxLevelReached);
    assert_eq!(game.player(Owner::Blue).coins, 850);

    driver.drive_ticks(&mut game, 10);
    // RED earns from BLUE's mining level 3, BLUE from RED's level 1.
    assert_eq!(game.player(Owner::Red).coins, 1070);
    assert_eq!(game.player(Owner::Blue).coins, 860);

    let snapshot = game.snapshot(Owner::Blue);
    assert_eq!(snapshot.mining_level, 3);
    assert_eq!(snapshot.mining_upgrade_cost, 200);
}

#[test]
fn tech_upgrade_is_tracked() {
    let mut game = Game::new(test_config());
    game.apply_command(PlayerCommand::new(Owner::Red, Command::InvestTech))
        .unwrap();
    let snapshot = game.snapshot(Owner::Red);
    assert_eq!(snapshot.tech_level, 2);
    assert_eq!(snapshot.tech_upgrade_cost, 100);
    assert_eq!(snapshot.coins, 50);
}
