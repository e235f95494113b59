use std::collections::VecDeque;

use crate::game::Player;

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    /// `None` for a draw.
    pub loser: Option<Player>,
    pub game_length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    update_losses: VecDeque<f32>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
    total_updates: usize,
    no_action_events: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            update_losses: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            total_updates: 0,
            no_action_events: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    pub fn record_update(&mut self, loss: f32) {
        self.total_updates += 1;
        self.update_losses.push_back(loss);
        if self.update_losses.len() > self.capacity {
            self.update_losses.pop_front();
        }
    }

    pub fn record_no_action(&mut self) {
        self.no_action_events += 1;
    }

    /// Fraction of the last N episodes lost by `player`.
    pub fn loss_rate(&self, player: Player, last_n: usize) -> f32 {
        self.fraction(last_n, |r| r.loser == Some(player))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        self.fraction(last_n, |r| r.loser.is_none())
    }

    fn fraction(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(*r))
            .count();
        hits as f32 / n as f32
    }

    /// Average loss over the last N updates.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let n = self.update_losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.update_losses.iter().rev().take(n).sum();
        sum / n as f32
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f32 / n as f32
    }

    pub fn window(&self) -> usize {
        self.capacity
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    pub fn no_action_events(&self) -> usize {
        self.no_action_events
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(loser: Option<Player>, game_length: usize) -> EpisodeResult {
        EpisodeResult { loser, game_length }
    }

    #[test]
    fn test_empty_metrics() {
        let m = TrainingMetrics::new();
        assert_eq!(m.loss_rate(Player::One, 10), 0.0);
        assert_eq!(m.draw_rate(10), 0.0);
        assert_eq!(m.average_loss(10), 0.0);
        assert_eq!(m.average_game_length(10), 0.0);
        assert_eq!(m.total_episodes(), 0);
    }

    #[test]
    fn test_loss_and_draw_rates() {
        let mut m = TrainingMetrics::with_capacity(10);
        m.record_episode(result(Some(Player::One), 10));
        m.record_episode(result(Some(Player::Two), 12));
        m.record_episode(result(Some(Player::One), 8));
        m.record_episode(result(None, 36));

        assert!((m.loss_rate(Player::One, 4) - 0.5).abs() < 1e-6);
        assert!((m.loss_rate(Player::Two, 4) - 0.25).abs() < 1e-6);
        assert!((m.draw_rate(4) - 0.25).abs() < 1e-6);
        assert!((m.average_game_length(4) - 16.5).abs() < 1e-6);
        // Only the most recent two
        assert!((m.draw_rate(2) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut m = TrainingMetrics::with_capacity(3);
        m.record_episode(result(Some(Player::One), 5));
        for _ in 0..3 {
            m.record_episode(result(None, 9));
        }
        assert_eq!(m.total_episodes(), 4);
        assert_eq!(m.loss_rate(Player::One, 100), 0.0);
        assert_eq!(m.draw_rate(100), 1.0);
    }

    #[test]
    fn test_average_loss() {
        let mut m = TrainingMetrics::with_capacity(2);
        m.record_update(4.0);
        m.record_update(1.0);
        m.record_update(3.0);
        assert_eq!(m.total_updates(), 3);
        assert!((m.average_loss(10) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_action_counter() {
        let mut m = TrainingMetrics::new();
        m.record_no_action();
        assert_eq!(m.no_action_events(), 1);
    }
}
