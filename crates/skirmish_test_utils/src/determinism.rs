//! Determinism testing utilities.
//!
//! A match is fully determined by its config (including the spawn seed),
//! the commands issued on each tick and the frame timestamps fed to
//! [`Game::update`]. The harness here replays a [`MatchScript`] several
//! times and compares [`Game::state_hash`] across runs.
//!
//! # Sources of divergence
//!
//! - **Unseeded randomness**: spawn placement must only draw from the
//!   match PRNG.
//! - **Iteration order**: the combat step walks the roster by slot index;
//!   anything keyed by a hash map must not leak into state.
//! - **Wall-clock reads**: the core never reads the system clock itself.

use skirmish_core::config::MatchConfig;
use skirmish_core::game::Game;
use skirmish_core::protocol::PlayerCommand;
use skirmish_core::victory::Outcome;

use crate::fixtures::FrameDriver;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash of each run.
    pub hashes: Vec<u64>,
    /// Ticks simulated per run.
    pub ticks: u64,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>, ticks: u64) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
            ticks,
        }
    }

    /// Distinct hashes across runs (one for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run ended in the same state.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Commands to issue on given ticks, plus an optional early battle start.
#[derive(Debug, Clone, Default)]
pub struct MatchScript {
    /// Match settings.
    pub config: MatchConfig,
    /// `(tick, command)` pairs. A command is applied before the frame that
    /// produces `tick + 1`.
    pub commands: Vec<(u64, PlayerCommand)>,
    /// Display tick after which the battle is started by hand.
    pub start_battle_at: Option<u64>,
    /// Frames to run at most.
    pub max_ticks: u64,
}

impl MatchScript {
    /// Empty script for `config` that runs `max_ticks` frames.
    #[must_use]
    pub fn new(config: MatchConfig, max_ticks: u64) -> Self {
        Self {
            config,
            max_ticks,
            ..Self::default()
        }
    }

    /// Issue `command` once the display time reaches `tick`.
    #[must_use]
    pub fn at(mut self, tick: u64, command: PlayerCommand) -> Self {
        self.commands.push((tick, command));
        self
    }

    /// Start the battle once the display time reaches `tick`.
    #[must_use]
    pub fn start_battle_at(mut self, tick: u64) -> Self {
        self.start_battle_at = Some(tick);
        self
    }
}

/// Final state of a scripted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRun {
    /// [`Game::state_hash`] after the last frame.
    pub hash: u64,
    /// Display time reached.
    pub ticks: u64,
    /// Result, if the match was decided.
    pub outcome: Option<Outcome>,
    /// Per-tick hashes, index 0 being the state before the first frame.
    pub trace: Vec<u64>,
}

/// Play a script against a fresh game.
///
/// Rejected commands are ignored.
#[must_use]
pub fn run_scripted_match(script: &MatchScript) -> MatchRun {
    let mut game = Game::new(script.config);
    let mut driver = FrameDriver::for_game(&game);
    let mut trace = Vec::with_capacity(script.max_ticks as usize + 1);
    trace.push(game.state_hash());

    for _ in 0..script.max_ticks {
        let tick = game.display_time();
        for (_, command) in script.commands.iter().filter(|(at, _)| *at == tick) {
            if let Err(e) = game.apply_command(*command) {
                tracing::trace!(tick, error = %e, "Scripted command rejected");
            }
        }
        if script.start_battle_at == Some(tick) {
            game.start_battle();
        }

        driver.frame(&mut game);
        trace.push(game.state_hash());
        if game.is_finished() {
            break;
        }
    }

    MatchRun {
        hash: game.state_hash(),
        ticks: game.display_time(),
        outcome: game.outcome(),
        trace,
    }
}

/// Replay a script `runs` times and compare the final hashes.
#[must_use]
pub fn verify_script_determinism(script: &MatchScript, runs: usize) -> DeterminismResult {
    let results: Vec<MatchRun> = (0..runs).map(|_| run_scripted_match(script)).collect();
    let ticks = results.first().map_or(0, |r| r.ticks);
    DeterminismResult::from_hashes(results.into_iter().map(|r| r.hash).collect(), ticks)
}

/// Replay a script twice and panic if the runs diverge.
///
/// # Panics
///
/// Panics if the final hashes differ.
pub fn assert_deterministic(script: &MatchScript) {
    verify_script_determinism(script, 2).assert_deterministic();
}

/// Run any state machine several times and compare final hashes.
///
/// # Example
///
/// ```
/// use skirmish_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
/// assert!(result.is_deterministic);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes = (0..runs)
        .map(|_| {
            let mut state = setup();
            for _ in 0..ticks {
                step(&mut state);
            }
            hash(&state)
        })
        .collect();
    DeterminismResult::from_hashes(hashes, ticks)
}

/// First tick at which two replays of a script differ.
///
/// Returns `None` when the traces match.
#[must_use]
pub fn find_first_divergence(script: &MatchScript) -> Option<u64> {
    let a = run_scripted_match(script).trace;
    let b = run_scripted_match(script).trace;
    a.iter()
        .zip(&b)
        .position(|(x, y)| x != y)
        .map(|i| i as u64)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len()) as u64))
}

/// Proptest strategies for matches and units.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::components::Owner;
    use skirmish_core::config::MatchConfig;
    use skirmish_core::protocol::{Command, PlayerCommand};

    use super::MatchScript;

    /// Either side.
    pub fn arb_owner() -> impl Strategy<Value = Owner> {
        prop_oneof![Just(Owner::Blue), Just(Owner::Red)]
    }

    /// Any agent command.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::BuyUnit),
            Just(Command::InvestTech),
            Just(Command::InvestMining),
            Just(Command::NoOp),
        ]
    }

    /// A command tagged with a random issuer.
    pub fn arb_player_command() -> impl Strategy<Value = PlayerCommand> {
        (arb_owner(), arb_command()).prop_map(|(owner, command)| PlayerCommand::new(owner, command))
    }

    /// A point on a field of side `size`, bounds included.
    pub fn arb_field_point(size: i32) -> impl Strategy<Value = (i32, i32)> {
        (0..=size, 0..=size)
    }

    /// Soldiers placed anywhere on a default-sized field.
    pub fn arb_unit_layout(max_units: usize) -> impl Strategy<Value = Vec<(Owner, i32, i32)>> {
        proptest::collection::vec(
            (arb_owner(), arb_field_point(400)).prop_map(|(o, (x, y))| (o, x, y)),
            1..max_units,
        )
    }

    /// Fast config with a random seed.
    pub fn arb_config() -> impl Strategy<Value = MatchConfig> {
        (any::<u64>(), 8u32..64).prop_map(|(seed, speed)| MatchConfig {
            seed,
            speed,
            setup_phase_ticks: 40,
            ..MatchConfig::default()
        })
    }

    /// A setup-phase script: commands spread over the first ticks, then a
    /// battle start.
    pub fn arb_script(max_commands: usize, max_ticks: u64) -> impl Strategy<Value = MatchScript> {
        (
            arb_config(),
            proptest::collection::vec((0u64..30, arb_player_command()), 0..max_commands),
            proptest::option::of(0u64..40),
        )
            .prop_map(move |(config, commands, start_battle_at)| MatchScript {
                config,
                commands,
                start_battle_at,
                max_ticks,
            })
    }
}
