use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::agent::Agent;
use crate::ai::approximator::ValueApproximator;
use crate::ai::state_encoding::encode_state;
use crate::game::{GameState, Position};

/// Anything that can choose a move for the player to act.
///
/// `click` carries a board cell picked by a human through whatever input
/// layer drives the game; automated controllers ignore it.
pub trait PlayerController {
    fn get_move(&mut self, state: &GameState, click: Option<Position>) -> Option<Position>;

    fn name(&self) -> &str;

    fn is_human(&self) -> bool {
        false
    }
}

/// Plays whatever cell the input layer reports.
#[derive(Debug, Default)]
pub struct HumanPlayer;

impl PlayerController for HumanPlayer {
    fn get_move(&mut self, _state: &GameState, click: Option<Position>) -> Option<Position> {
        click
    }

    fn name(&self) -> &str {
        "Human"
    }

    fn is_human(&self) -> bool {
        true
    }
}

/// Picks uniformly among the empty cells.
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new() -> Self {
        RandomPlayer {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomPlayer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController for RandomPlayer {
    fn get_move(&mut self, state: &GameState, _click: Option<Position>) -> Option<Position> {
        let moves = state.legal_moves();
        if moves.is_empty() {
            return None;
        }
        Some(moves[self.rng.random_range(0..moves.len())])
    }

    fn name(&self) -> &str {
        "Random"
    }
}

impl<V: ValueApproximator> PlayerController for Agent<V> {
    fn get_move(&mut self, state: &GameState, _click: Option<Position>) -> Option<Position> {
        self.select_action(&encode_state(state))
    }

    fn name(&self) -> &str {
        "Agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::approximator::UniformScores;
    use crate::ai::EpsilonSchedule;
    use crate::game::HipGame;

    #[test]
    fn test_random_player_selects_legal_move() {
        let mut player = RandomPlayer::with_seed(11);
        let mut game = HipGame::new(4, 4);
        game.apply_move(crate::game::Player::One, 2, 2);
        let state = game.state();

        for _ in 0..100 {
            let pos = player.get_move(&state, None).unwrap();
            assert!(state.board().is_empty_at(pos));
        }
    }

    #[test]
    fn test_random_players_finish_a_game() {
        let mut players = [RandomPlayer::with_seed(1), RandomPlayer::with_seed(2)];
        let mut game = HipGame::new(5, 5);
        let mut turn = 0;
        while !game.is_terminal() {
            let pos = players[turn % 2].get_move(&game.state(), None).unwrap();
            let player = game.current_player();
            assert!(game.apply_move(player, pos.x, pos.y));
            turn += 1;
        }
        assert!(game.outcome().is_some());
        assert_eq!(game.moves_count(), turn);
    }

    #[test]
    fn test_human_player_echoes_click() {
        let mut human = HumanPlayer;
        let state = HipGame::new(3, 3).state();
        assert!(human.is_human());
        assert_eq!(human.get_move(&state, None), None);
        assert_eq!(
            human.get_move(&state, Some(Position::new(1, 2))),
            Some(Position::new(1, 2))
        );
    }

    #[test]
    fn test_agent_as_controller() {
        let mut agent = Agent::new(UniformScores::new(1.0), EpsilonSchedule::greedy(), 3, true);
        let state = HipGame::new(3, 3).state();
        assert!(!agent.is_human());
        assert_eq!(agent.name(), "Agent");
        assert_eq!(
            agent.get_move(&state, Some(Position::new(2, 2))),
            Some(Position::new(0, 0))
        );
    }
}
