//! Training infrastructure: replay buffer, reward shaping, rolling metrics,
//! match play and evaluation, and the episodic training session.

pub mod episode;
pub mod metrics;
pub mod replay_buffer;
pub mod rewards;
pub mod session;

pub use episode::{evaluate_vs_random, play_match, EvalSummary, MatchResult};
pub use metrics::{EpisodeResult, TrainingMetrics};
pub use replay_buffer::ReplayBuffer;
pub use rewards::{reward_cooperative, reward_usual, RewardFn, RewardScheme};
pub use session::{TrainingConfig, TrainingSession};
