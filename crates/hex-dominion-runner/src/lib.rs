//! Hex Dominion Runner
//!
//! Drives automated players through their turns at a watchable pace. The
//! loop plays one turn at a time, hands control back as soon as a human
//! player is up, and can be asked to pause between turns.
//!
//! ```ignore
//! let auto = AutoPlay::new(scheduler);
//! match auto.run().await? {
//!     LoopExit::WaitingForHuman(player) => { /* wait for input */ }
//!     LoopExit::GameOver(winner) => { /* show results */ }
//!     _ => {}
//! }
//! ```

pub mod pacer;

use hex_dominion_core::{ActorKind, GameError, GamePhase, PlayerId, TurnScheduler};
use pacer::RunningGuard;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Why [`AutoPlay::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// Another run was already in flight; nothing was played.
    AlreadyRunning,
    /// A pause was requested and honored at a turn boundary.
    Paused,
    /// The current player is controlled by a human.
    WaitingForHuman(PlayerId),
    /// The game has ended with this winner.
    GameOver(PlayerId),
}

/// Errors from the turn loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Shared handle to a scheduler played by automated actors.
///
/// Cloning the handle shares the scheduler and both flags.
#[derive(Clone)]
pub struct AutoPlay {
    scheduler: Arc<Mutex<TurnScheduler>>,
    running: Arc<AtomicBool>,
    pause: Arc<AtomicBool>,
}

impl AutoPlay {
    pub fn new(scheduler: TurnScheduler) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            running: Arc::new(AtomicBool::new(false)),
            pause: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The shared scheduler, for human input and rendering.
    pub fn scheduler(&self) -> Arc<Mutex<TurnScheduler>> {
        Arc::clone(&self.scheduler)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask a running loop to stop before the next turn.
    pub fn request_pause(&self) {
        self.pause.store(true, Ordering::Release);
    }

    /// Withdraw a pause request. The loop must be started again with
    /// [`AutoPlay::run`].
    pub fn resume(&self) {
        self.pause.store(false, Ordering::Release);
    }

    pub fn is_pause_requested(&self) -> bool {
        self.pause.load(Ordering::Acquire)
    }

    /// Play automated turns until a human is up, a pause is requested or
    /// the game ends.
    ///
    /// A game still in setup is started first. Every automated turn takes
    /// at least the configured minimum turn duration.
    pub async fn run(&self) -> Result<LoopExit, RunnerError> {
        let Some(_guard) = RunningGuard::acquire(&self.running) else {
            debug!("turn loop already running");
            return Ok(LoopExit::AlreadyRunning);
        };

        let exit = loop {
            if self.is_pause_requested() {
                break LoopExit::Paused;
            }

            // The checks and the turn share one lock, so nobody can end the
            // turn in between.
            let mut scheduler = self.scheduler.lock().await;
            if scheduler.state().phase == GamePhase::Setup {
                scheduler.start()?;
            }
            if let Some((winner, _)) = scheduler.state().winner {
                break LoopExit::GameOver(winner);
            }
            if scheduler.current_actor_kind() != Some(ActorKind::Automated) {
                break LoopExit::WaitingForHuman(scheduler.state().current_player);
            }

            let min_duration = scheduler.min_turn_duration();
            let turn = async move {
                scheduler.play_automated_turn()?;
                scheduler.end_turn()
            };
            let outcome = pacer::paced(min_duration, turn).await?;
            debug!(
                player = outcome.finished,
                eliminated = outcome.eliminated.len(),
                "automated turn played"
            );
        };

        info!(?exit, "turn loop stopped");
        Ok(exit)
    }
}

impl std::fmt::Debug for AutoPlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPlay")
            .field("running", &self.is_running())
            .field("pause", &self.is_pause_requested())
            .finish_non_exhaustive()
    }
}
