//! Core Hip game logic: board representation with square detection, player
//! ids, immutable state snapshots, and the mutable rules engine.

mod board;
mod engine;
mod player;
mod state;

pub use board::{Board, Cell, Position, Square};
pub use engine::HipGame;
pub use player::Player;
pub use state::{GameOutcome, GameState, MoveError};
