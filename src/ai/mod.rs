mod agent;
pub mod approximator;
pub mod networks;
mod players;
pub mod state_encoding;
pub mod trainer;

pub use agent::{Agent, EpsilonSchedule, Transition};
pub use approximator::{UniformScores, ValueApproximator};
pub use networks::{ValueNetwork, ValueNetworkConfig};
pub use players::{HumanPlayer, PlayerController, RandomPlayer};
pub use state_encoding::{encode_state, EncodedState};
pub use trainer::{bellman_targets, DqnConfig, InferBackend, TrainBackend, Trainer};
