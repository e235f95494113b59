use super::{Board, Player, Position, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameOutcome {
    /// The player completed a square of their own marks.
    Loser(Player),
    /// The board filled up with no square.
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("({x}, {y}) is outside the board")]
    OutOfBounds { x: usize, y: usize },
    #[error("cell ({}, {}) is already occupied", .0.x, .0.y)]
    Occupied(Position),
    #[error("the game is already over")]
    GameOver,
}

/// Snapshot of a game at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(super) board: Board,
    pub(super) current_player: Player,
    pub(super) outcome: Option<GameOutcome>,
    pub(super) losing_square: Option<Square>,
    pub(super) moves_count: usize,
}

impl GameState {
    /// Player to move next
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn loser(&self) -> Option<Player> {
        match self.outcome {
            Some(GameOutcome::Loser(p)) => Some(p),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.outcome == Some(GameOutcome::Draw)
    }

    /// Vertices of the square that ended the game, if any.
    pub fn losing_square(&self) -> Option<Square> {
        self.losing_square
    }

    pub fn moves_count(&self) -> usize {
        self.moves_count
    }

    /// Empty cells in row-major order; none once the game is over.
    pub fn legal_moves(&self) -> Vec<Position> {
        if self.is_terminal() {
            return Vec::new();
        }
        let width = self.board.width();
        self.board
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == super::Cell::Empty)
            .map(|(i, _)| Position::from_index(i, width))
            .collect()
    }
}
