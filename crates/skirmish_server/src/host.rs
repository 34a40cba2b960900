//! Match host: drives one [`Game`] from a frame loop.
//!
//! The host exclusively owns the game. Agents talk to it through a
//! [`MatchHandle`]: snapshots fan out on a broadcast channel, commands come
//! back through an mpsc inbox, and the match status is published on a watch
//! channel. Messages queued before a frame are applied before that frame's
//! tick; later ones wait for the next frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};

use skirmish_core::components::Owner;
use skirmish_core::config::MatchConfig;
use skirmish_core::game::{Game, TickEvents};
use skirmish_core::protocol::{Command, MatchId, PlayerCommand, Snapshot};
use skirmish_core::victory::Outcome;

use crate::error::{ServerError, ServerResult};
use crate::report::MatchReport;
use crate::ServerConfig;

/// Coarse match status for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Accepting economy commands.
    Setup,
    /// Units are fighting.
    Battle,
    /// The host loop has stopped. Carries the result if there was one.
    Finished(Option<Outcome>),
}

/// Message queued for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inbound {
    Command(PlayerCommand),
    StartBattle,
}

/// Cloneable handle for talking to a running match.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    match_id: MatchId,
    inbox: mpsc::Sender<Inbound>,
    snapshots: broadcast::Sender<Snapshot>,
    status: watch::Receiver<MatchStatus>,
    shutdown: Arc<AtomicBool>,
}

impl MatchHandle {
    /// Id of the match.
    #[must_use]
    pub const fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Receive every snapshot published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Watch the match status.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<MatchStatus> {
        self.status.clone()
    }

    /// Current match status.
    #[must_use]
    pub fn status(&self) -> MatchStatus {
        *self.status.borrow()
    }

    /// Queue a command for `owner`.
    ///
    /// # Errors
    ///
    /// [`ServerError::InboxClosed`] once the host is gone.
    pub async fn send(&self, owner: Owner, command: Command) -> ServerResult<()> {
        self.push(Inbound::Command(PlayerCommand::new(owner, command)))
            .await
    }

    /// Ask the host to end the setup phase.
    ///
    /// # Errors
    ///
    /// [`ServerError::InboxClosed`] once the host is gone.
    pub async fn start_battle(&self) -> ServerResult<()> {
        self.push(Inbound::StartBattle).await
    }

    /// Ask the host loop to stop after the current frame.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Whether a shutdown was requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    async fn push(&self, message: Inbound) -> ServerResult<()> {
        self.inbox
            .send(message)
            .await
            .map_err(|_| ServerError::InboxClosed(self.match_id))
    }
}

/// Owner of a running match.
#[derive(Debug)]
pub struct MatchHost {
    game: Game,
    inbox: mpsc::Receiver<Inbound>,
    snapshots: broadcast::Sender<Snapshot>,
    status: watch::Sender<MatchStatus>,
    shutdown: Arc<AtomicBool>,
}

impl MatchHost {
    /// Create a host with default channel sizes.
    #[must_use]
    pub fn new(config: MatchConfig) -> (Self, MatchHandle) {
        Self::with_server_config(config, &ServerConfig::default())
    }

    /// Create a host with explicit channel sizes.
    #[must_use]
    pub fn with_server_config(config: MatchConfig, server: &ServerConfig) -> (Self, MatchHandle) {
        Self::from_game(Game::new(config), server)
    }

    /// Host an already staged game.
    #[must_use]
    pub fn from_game(game: Game, server: &ServerConfig) -> (Self, MatchHandle) {
        let (inbox_tx, inbox_rx) = mpsc::channel(server.inbox_capacity.max(1));
        let (snapshot_tx, _) = broadcast::channel(server.snapshot_capacity.max(1));
        let initial = if game.is_setup_phase() {
            MatchStatus::Setup
        } else {
            MatchStatus::Battle
        };
        let (status_tx, status_rx) = watch::channel(initial);
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = MatchHandle {
            match_id: game.id(),
            inbox: inbox_tx,
            snapshots: snapshot_tx.clone(),
            status: status_rx,
            shutdown: Arc::clone(&shutdown),
        };
        let host = Self {
            game,
            inbox: inbox_rx,
            snapshots: snapshot_tx,
            status: status_tx,
            shutdown,
        };
        (host, handle)
    }

    /// The hosted game.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Drain the inbox, then offer one frame timestamp to the game and
    /// publish what it produced.
    pub fn pump(&mut self, now: Duration) -> TickEvents {
        self.drain_inbox();

        let events = self.game.update(now);
        for snapshot in &events.snapshots {
            if self.snapshots.send(*snapshot).is_err() {
                tracing::trace!(match_id = %self.game.id(), "No snapshot subscribers");
            }
        }
        if events.battle_started {
            self.status.send_replace(MatchStatus::Battle);
        }
        events
    }

    fn drain_inbox(&mut self) {
        while let Ok(message) = self.inbox.try_recv() {
            match message {
                Inbound::Command(command) => {
                    if let Err(e) = self.game.apply_command(command) {
                        tracing::debug!(
                            match_id = %self.game.id(),
                            owner = %command.owner,
                            command = ?command.command,
                            error = %e,
                            "Command rejected"
                        );
                    }
                }
                Inbound::StartBattle => {
                    if self.game.start_battle() {
                        self.status.send_replace(MatchStatus::Battle);
                    }
                }
            }
        }
    }

    /// Run the frame loop until the match is decided or a shutdown is
    /// requested.
    pub async fn run(mut self, frame_interval: Duration) -> MatchReport {
        let match_id = self.game.id();
        tracing::info!(%match_id, speed = self.game.config().speed, "Match started");

        let start = Instant::now();
        let mut frames = interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            frames.tick().await;

            if self.shutdown.load(Ordering::Relaxed) {
                tracing::info!(%match_id, tick = self.game.display_time(), "Match shut down");
                break;
            }

            self.pump(start.elapsed());

            if self.game.is_finished() {
                break;
            }
        }

        self.status
            .send_replace(MatchStatus::Finished(self.game.outcome()));
        MatchReport::from_game(&self.game)
    }

    /// Spawn [`MatchHost::run`] on the tokio runtime.
    pub fn spawn(self, frame_interval: Duration) -> tokio::task::JoinHandle<MatchReport> {
        tokio::spawn(self.run(frame_interval))
    }
}
