use crate::ai::{Agent, PlayerController, RandomPlayer, ValueApproximator};
use crate::error::TrainingError;
use crate::game::{GameOutcome, HipGame, Player, Square};

/// Result of one finished match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub outcome: GameOutcome,
    pub moves: usize,
    pub losing_square: Option<Square>,
}

/// Play one game to the end, `first` moving as Player 1.
///
/// A controller that returns no move or an illegal move aborts the match.
pub fn play_match(
    first: &mut dyn PlayerController,
    second: &mut dyn PlayerController,
    width: usize,
    height: usize,
) -> Result<MatchResult, TrainingError> {
    let mut game = HipGame::new(width, height);

    while !game.is_terminal() {
        let player = game.current_player();
        let state = game.state();
        let choice = match player {
            Player::One => first.get_move(&state, None),
            Player::Two => second.get_move(&state, None),
        };
        let pos = choice.ok_or(TrainingError::NoMove { player })?;
        if !game.apply_move(player, pos.x, pos.y) {
            return Err(TrainingError::IllegalMove {
                player,
                position: pos,
            });
        }
    }

    let state = game.state();
    Ok(MatchResult {
        // the loop only exits once an outcome is recorded
        outcome: state.outcome().unwrap_or(GameOutcome::Draw),
        moves: state.moves_count(),
        losing_square: state.losing_square(),
    })
}

/// Tally of an evaluation series from the agent's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub games: usize,
    pub agent_losses: usize,
    pub opponent_losses: usize,
    pub draws: usize,
}

impl EvalSummary {
    pub fn agent_loss_rate(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.agent_losses as f32 / self.games as f32
    }

    pub fn draw_rate(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.draws as f32 / self.games as f32
    }
}

/// Play `games` greedy games against a random opponent, alternating who
/// moves first. The agent's play mode is restored afterwards.
pub fn evaluate_vs_random<V: ValueApproximator>(
    agent: &mut Agent<V>,
    opponent: &mut RandomPlayer,
    width: usize,
    height: usize,
    games: usize,
) -> Result<EvalSummary, TrainingError> {
    let previous_mode = agent.is_play_mode();
    agent.set_play_mode(true);
    let summary = run_eval_series(agent, opponent, width, height, games);
    agent.set_play_mode(previous_mode);
    summary
}

fn run_eval_series<V: ValueApproximator>(
    agent: &mut Agent<V>,
    opponent: &mut RandomPlayer,
    width: usize,
    height: usize,
    games: usize,
) -> Result<EvalSummary, TrainingError> {
    let mut summary = EvalSummary::default();

    for game in 0..games {
        let agent_side = if game % 2 == 0 { Player::One } else { Player::Two };
        let result = match agent_side {
            Player::One => play_match(&mut *agent, &mut *opponent, width, height)?,
            Player::Two => play_match(&mut *opponent, &mut *agent, width, height)?,
        };

        summary.games += 1;
        match result.outcome {
            GameOutcome::Draw => summary.draws += 1,
            GameOutcome::Loser(p) if p == agent_side => summary.agent_losses += 1,
            GameOutcome::Loser(_) => summary.opponent_losses += 1,
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{EpsilonSchedule, HumanPlayer, UniformScores};
    use crate::game::{GameState, Position};

    /// Always asks for the same cell.
    struct Stubborn(Position);

    impl PlayerController for Stubborn {
        fn get_move(&mut self, _state: &GameState, _click: Option<Position>) -> Option<Position> {
            Some(self.0)
        }

        fn name(&self) -> &str {
            "Stubborn"
        }
    }

    #[test]
    fn test_random_match_reaches_outcome() {
        let mut a = RandomPlayer::with_seed(3);
        let mut b = RandomPlayer::with_seed(4);
        let result = play_match(&mut a, &mut b, 4, 4).unwrap();
        assert!(result.moves <= 16);
        if let GameOutcome::Loser(_) = result.outcome {
            assert!(result.losing_square.is_some());
        }
    }

    #[test]
    fn test_illegal_move_is_fatal() {
        let mut a = Stubborn(Position::new(0, 0));
        let mut b = Stubborn(Position::new(0, 0));
        let err = play_match(&mut a, &mut b, 3, 3).unwrap_err();
        match err {
            TrainingError::IllegalMove { player, position } => {
                assert_eq!(player, Player::Two);
                assert_eq!(position, Position::new(0, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_move_is_fatal() {
        let mut human = HumanPlayer;
        let mut random = RandomPlayer::with_seed(0);
        let err = play_match(&mut human, &mut random, 3, 3).unwrap_err();
        assert!(matches!(err, TrainingError::NoMove { player: Player::One }));
    }

    #[test]
    fn test_evaluation_counts_every_game() {
        let mut agent = Agent::with_seed(
            UniformScores::new(0.0),
            EpsilonSchedule::new(1.0, 1.0, 1),
            4,
            false,
            8,
        );
        let mut opponent = RandomPlayer::with_seed(9);
        let summary = evaluate_vs_random(&mut agent, &mut opponent, 4, 4, 10).unwrap();

        assert_eq!(summary.games, 10);
        assert_eq!(
            summary.agent_losses + summary.opponent_losses + summary.draws,
            10
        );
        assert!(!agent.is_play_mode());
        assert_eq!(agent.epsilon(), 1.0);
    }

    #[test]
    fn test_empty_summary_rates() {
        let summary = EvalSummary::default();
        assert_eq!(summary.agent_loss_rate(), 0.0);
        assert_eq!(summary.draw_rate(), 0.0);
    }
}
