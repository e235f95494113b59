//! # Hip
//!
//! The square-avoidance grid game: two players alternately mark cells and
//! whoever completes four of their own marks on the corners of any square,
//! axis-aligned or rotated, loses. Includes a DQN self-play training system
//! built on the Burn ML framework.
//!
//! ## Modules
//!
//! - [`game`]: Board, square detection, rules engine
//! - [`ai`]: State encoding, value network, DQN trainer, epsilon-greedy agent, player controllers
//! - [`training`]: Replay buffer, reward shaping, metrics, match play, training session
//! - [`checkpoint`]: Model persistence and versioning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
