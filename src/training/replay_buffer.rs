use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::ai::Transition;
use crate::error::ReplayError;

/// Fixed-capacity ring buffer of transitions. Once full, each push
/// overwrites the oldest record.
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    position: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "replay capacity must be > 0");
        ReplayBuffer {
            buffer: Vec::with_capacity(capacity.min(4096)),
            capacity,
            position: 0,
            rng,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// Uniform sample of `batch_size` distinct records.
    pub fn sample(&mut self, batch_size: usize) -> Result<Vec<Transition>, ReplayError> {
        if batch_size > self.buffer.len() {
            return Err(ReplayError::InsufficientData {
                requested: batch_size,
                stored: self.buffer.len(),
            });
        }
        let indices = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        Ok(indices.iter().map(|i| self.buffer[i].clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::state_encoding::encode_state;
    use crate::game::HipGame;

    fn transition(reward: f32) -> Transition {
        let state = encode_state(&HipGame::new(3, 3).state());
        Transition {
            next_state: state.clone(),
            state,
            action: 0,
            reward,
            done: false,
        }
    }

    fn sorted_rewards(batch: &[Transition]) -> Vec<f32> {
        let mut rewards: Vec<f32> = batch.iter().map(|t| t.reward).collect();
        rewards.sort_by(|a, b| a.partial_cmp(b).unwrap());
        rewards
    }

    #[test]
    fn test_push_and_len() {
        let mut buf = ReplayBuffer::new(10);
        assert!(buf.is_empty());

        buf.push(transition(0.0));
        assert_eq!(buf.len(), 1);

        for _ in 0..9 {
            buf.push(transition(0.0));
        }
        assert_eq!(buf.len(), 10);
        assert_eq!(buf.capacity(), 10);
    }

    #[test]
    fn test_oldest_record_is_evicted() {
        let mut buf = ReplayBuffer::with_seed(2, 1);
        buf.push(transition(1.0));
        buf.push(transition(2.0));
        buf.push(transition(3.0));
        assert_eq!(buf.len(), 2);

        let batch = buf.sample(2).unwrap();
        assert_eq!(sorted_rewards(&batch), vec![2.0, 3.0]);
    }

    #[test]
    fn test_eviction_wraps_around() {
        let mut buf = ReplayBuffer::with_seed(3, 5);
        for r in 0..7 {
            buf.push(transition(r as f32));
        }
        let batch = buf.sample(3).unwrap();
        assert_eq!(sorted_rewards(&batch), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut buf = ReplayBuffer::with_seed(100, 9);
        for r in 0..50 {
            buf.push(transition(r as f32));
        }
        let batch = buf.sample(10).unwrap();
        assert_eq!(batch.len(), 10);
        let mut rewards = sorted_rewards(&batch);
        rewards.dedup();
        assert_eq!(rewards.len(), 10);
    }

    #[test]
    fn test_sample_too_many() {
        let mut buf = ReplayBuffer::new(10);
        buf.push(transition(0.0));
        assert_eq!(
            buf.sample(5).unwrap_err(),
            ReplayError::InsufficientData {
                requested: 5,
                stored: 1
            }
        );
    }
}
