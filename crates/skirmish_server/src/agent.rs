//! Scripted decision agents.
//!
//! An agent sees only [`Snapshot`]s addressed to its side and answers with
//! [`Command`]s. [`spawn_agent`] runs one as a tokio task wired to a
//! [`MatchHandle`]; the task stops once the setup phase is over.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use skirmish_core::components::Owner;
use skirmish_core::economy::MAX_LEVEL;
use skirmish_core::protocol::{Command, Snapshot};

use crate::host::{MatchHandle, MatchStatus};

/// Something that turns snapshots into commands.
pub trait Agent: Send + 'static {
    /// Commands to issue in response to `snapshot`.
    fn decide(&mut self, snapshot: &Snapshot) -> Vec<Command>;
}

/// Built-in play styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Never acts.
    #[default]
    Passive,
    /// Buys a soldier whenever it can afford one.
    Rush,
    /// Maxes mining and tech before buying soldiers.
    Economic,
}

impl Strategy {
    /// Agent playing this strategy.
    #[must_use]
    pub const fn agent(self) -> ScriptedAgent {
        ScriptedAgent::new(self)
    }
}

/// Agent following a fixed [`Strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedAgent {
    strategy: Strategy,
}

impl ScriptedAgent {
    /// Create an agent.
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Strategy being played.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl Agent for ScriptedAgent {
    fn decide(&mut self, snapshot: &Snapshot) -> Vec<Command> {
        let affordable = |cost: u32| snapshot.coins >= cost;

        let command = match self.strategy {
            Strategy::Passive => None,
            Strategy::Rush => affordable(snapshot.next_unit_cost).then_some(Command::BuyUnit),
            Strategy::Economic => {
                if snapshot.mining_level < MAX_LEVEL {
                    affordable(snapshot.mining_upgrade_cost).then_some(Command::InvestMining)
                } else if snapshot.tech_level < MAX_LEVEL {
                    affordable(snapshot.tech_upgrade_cost).then_some(Command::InvestTech)
                } else {
                    affordable(snapshot.next_unit_cost).then_some(Command::BuyUnit)
                }
            }
        };
        command.into_iter().collect()
    }
}

/// Run `agent` for `owner` until the setup phase ends or the match goes
/// away.
pub fn spawn_agent<A: Agent>(handle: &MatchHandle, owner: Owner, mut agent: A) -> JoinHandle<()> {
    let mut snapshots = handle.subscribe();
    let mut status = handle.watch_status();
    let handle = handle.clone();

    tokio::spawn(async move {
        let match_id = handle.match_id();
        if !in_setup(&status) {
            return;
        }

        loop {
            tokio::select! {
                received = snapshots.recv() => match received {
                    Ok(snapshot) if snapshot.owner == owner => {
                        for command in agent.decide(&snapshot) {
                            if handle.send(owner, command).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(%match_id, %owner, missed, "Agent fell behind on snapshots");
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = status.changed() => {
                    if changed.is_err() || !in_setup(&status) {
                        break;
                    }
                }
            }
        }
        tracing::debug!(%match_id, %owner, "Agent stopped");
    })
}

fn in_setup(status: &watch::Receiver<MatchStatus>) -> bool {
    *status.borrow() == MatchStatus::Setup
}
