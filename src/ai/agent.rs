use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::approximator::ValueApproximator;
use crate::ai::state_encoding::EncodedState;
use crate::ai::trainer::{DqnConfig, Trainer};
use crate::config::AppConfig;
use crate::error::ModelError;
use crate::game::Position;

/// A single step of experience for training.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EncodedState,
    /// Flat cell index `y * width + x` of the move.
    pub action: usize,
    pub reward: f32,
    pub next_state: EncodedState,
    pub done: bool,
}

/// Linear epsilon anneal over a number of played games, clamped at `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonSchedule {
    pub start: f32,
    pub end: f32,
    pub decay_games: usize,
}

impl EpsilonSchedule {
    pub fn new(start: f32, end: f32, decay_games: usize) -> Self {
        EpsilonSchedule {
            start,
            end,
            decay_games,
        }
    }

    /// A schedule that never explores.
    pub fn greedy() -> Self {
        Self::new(0.0, 0.0, 0)
    }

    pub fn value_at(&self, games_played: usize) -> f32 {
        if games_played >= self.decay_games {
            return self.end;
        }
        let progress = games_played as f32 / self.decay_games as f32;
        (self.start - progress * (self.start - self.end)).max(self.end)
    }
}

impl From<&DqnConfig> for EpsilonSchedule {
    fn from(config: &DqnConfig) -> Self {
        EpsilonSchedule::new(
            config.epsilon_start,
            config.epsilon_end,
            config.epsilon_decay_games,
        )
    }
}

/// Epsilon-greedy policy over a value approximator, restricted to legal cells.
///
/// In play mode the agent never explores, whatever its epsilon.
pub struct Agent<V = Trainer> {
    approximator: V,
    schedule: EpsilonSchedule,
    epsilon: f32,
    games_played: usize,
    width: usize,
    play_mode: bool,
    rng: StdRng,
}

impl<V: ValueApproximator> Agent<V> {
    pub fn new(approximator: V, schedule: EpsilonSchedule, width: usize, play_mode: bool) -> Self {
        Self::with_rng(approximator, schedule, width, play_mode, StdRng::from_os_rng())
    }

    /// Agent with a deterministic exploration stream.
    pub fn with_seed(
        approximator: V,
        schedule: EpsilonSchedule,
        width: usize,
        play_mode: bool,
        seed: u64,
    ) -> Self {
        Self::with_rng(approximator, schedule, width, play_mode, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        approximator: V,
        schedule: EpsilonSchedule,
        width: usize,
        play_mode: bool,
        rng: StdRng,
    ) -> Self {
        Agent {
            approximator,
            epsilon: schedule.value_at(0),
            schedule,
            games_played: 0,
            width,
            play_mode,
            rng,
        }
    }

    /// Choose a move, or `None` when the state has no legal cell.
    pub fn select_action(&mut self, state: &EncodedState) -> Option<Position> {
        let legal = state.legal_indices();
        if legal.is_empty() {
            return None;
        }

        let index = if !self.play_mode && self.rng.random::<f32>() < self.epsilon {
            legal[self.rng.random_range(0..legal.len())]
        } else {
            let scores = self.approximator.score(state);
            let mut best = legal[0];
            let mut best_score = f32::NEG_INFINITY;
            for &i in &legal {
                if scores[i] > best_score {
                    best_score = scores[i];
                    best = i;
                }
            }
            best
        };

        Some(Position::from_index(index, self.width))
    }

    /// Recompute epsilon from the schedule.
    pub fn decay_epsilon(&mut self, games_played: usize) {
        self.epsilon = self.schedule.value_at(games_played);
    }

    /// Count a finished game and anneal epsilon accordingly.
    pub fn record_game(&mut self) {
        self.games_played += 1;
        self.decay_epsilon(self.games_played);
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
    }

    pub fn games_played(&self) -> usize {
        self.games_played
    }

    /// Restore the game counter (and the epsilon it implies) after a resume.
    pub fn set_games_played(&mut self, games_played: usize) {
        self.games_played = games_played;
        self.decay_epsilon(games_played);
    }

    pub fn schedule(&self) -> &EpsilonSchedule {
        &self.schedule
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_play_mode(&self) -> bool {
        self.play_mode
    }

    pub fn set_play_mode(&mut self, play_mode: bool) {
        self.play_mode = play_mode;
    }

    pub fn approximator(&self) -> &V {
        &self.approximator
    }
}

impl Agent<Trainer> {
    /// Build the agent described by `config`.
    ///
    /// If `training.load_model_from` is set the saved parameters are loaded;
    /// a missing file keeps the fresh parameters, any other failure is returned.
    pub fn from_config(config: &AppConfig, play_mode: bool) -> Result<Self, ModelError> {
        let mut trainer = Trainer::for_board(config.board.width, config.board.height, &config.dqn);

        if let Some(path) = &config.training.load_model_from {
            match trainer.load(path) {
                Ok(()) => info!("Loaded model parameters from {}", path.display()),
                Err(ModelError::NotFound(file)) => {
                    info!(
                        "No saved model at {}, starting from fresh parameters",
                        file.display()
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Agent::new(
            trainer,
            EpsilonSchedule::from(&config.dqn),
            config.board.width,
            play_mode,
        ))
    }

    pub fn trainer(&self) -> &Trainer {
        &self.approximator
    }

    pub fn trainer_mut(&mut self) -> &mut Trainer {
        &mut self.approximator
    }
}
