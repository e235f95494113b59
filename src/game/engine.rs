use super::{Board, GameOutcome, GameState, MoveError, Player, Position, Square};

/// Mutable game driver: applies moves, detects squares, tracks the outcome.
#[derive(Debug, Clone)]
pub struct HipGame {
    board: Board,
    current_player: Player,
    outcome: Option<GameOutcome>,
    losing_square: Option<Square>,
    moves_count: usize,
}

impl HipGame {
    pub fn new(width: usize, height: usize) -> Self {
        HipGame {
            board: Board::new(width, height),
            current_player: Player::One,
            outcome: None,
            losing_square: None,
            moves_count: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn moves_count(&self) -> usize {
        self.moves_count
    }

    /// Place `player`'s mark at (x, y), reporting why a move was rejected.
    ///
    /// A rejected move leaves every piece of state untouched.
    pub fn try_move(&mut self, player: Player, x: usize, y: usize) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if !self.board.in_bounds(x, y) {
            return Err(MoveError::OutOfBounds { x, y });
        }
        let pos = Position::new(x, y);
        if !self.board.is_empty_at(pos) {
            return Err(MoveError::Occupied(pos));
        }

        self.moves_count += 1;
        self.board.place(pos, player);

        if let Some(square) = self.board.find_square_through(pos) {
            self.losing_square = Some(square);
            self.outcome = Some(GameOutcome::Loser(player));
        } else if self.board.is_full() {
            self.outcome = Some(GameOutcome::Draw);
        } else {
            self.current_player = player.other();
        }
        Ok(())
    }

    /// Apply a move; returns false and changes nothing if it is illegal.
    pub fn apply_move(&mut self, player: Player, x: usize, y: usize) -> bool {
        self.try_move(player, x, y).is_ok()
    }

    /// Snapshot of the current game.
    pub fn state(&self) -> GameState {
        GameState {
            board: self.board.clone(),
            current_player: self.current_player,
            outcome: self.outcome,
            losing_square: self.losing_square,
            moves_count: self.moves_count,
        }
    }

    pub fn reset(&mut self) {
        self.board.clear();
        self.current_player = Player::One;
        self.outcome = None;
        self.losing_square = None;
        self.moves_count = 0;
    }
}
