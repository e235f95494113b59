use super::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    One,
    Two,
}

impl Cell {
    /// Value of this cell in the encoded state (0 for empty, else the player id).
    pub fn value(self) -> f32 {
        match self {
            Cell::Empty => 0.0,
            Cell::One => 1.0,
            Cell::Two => 2.0,
        }
    }
}

/// Board coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Row-major flat index on a board of the given width.
    pub fn index(self, width: usize) -> usize {
        self.y * width + self.x
    }

    pub fn from_index(index: usize, width: usize) -> Self {
        Position {
            x: index % width,
            y: index / width,
        }
    }
}

/// The four vertices of a completed square, in detection order.
pub type Square = [Position; 4];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Get the cell at a position. Panics if out of bounds.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.index(self.width)]
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Write a player's mark. Callers check bounds and occupancy first.
    pub fn place(&mut self, pos: Position, player: Player) {
        let idx = pos.index(self.width);
        self.cells[idx] = player.to_cell();
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != Cell::Empty)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Positions holding `player`'s marks, in row-major scan order.
    pub fn marks(&self, player: Player) -> impl Iterator<Item = Position> + '_ {
        let cell = player.to_cell();
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == cell)
            .map(move |(i, _)| Position::from_index(i, width))
    }

    /// Scan every pair of `player`'s marks for a completed square of any size
    /// and rotation. Returns the first square found in row-major pair order.
    pub fn find_square(&self, player: Player) -> Option<Square> {
        let marks: Vec<Position> = self.marks(player).collect();
        for (i, &p1) in marks.iter().enumerate() {
            for &p2 in &marks[i + 1..] {
                if let Some(square) = self.square_on_side(p1, p2, player) {
                    return Some(square);
                }
            }
        }
        None
    }

    /// Find a completed square that has `pos` as one of its vertices, using
    /// the owner of `pos`. Only such squares can be completed by the mark
    /// most recently placed at `pos`.
    pub fn find_square_through(&self, pos: Position) -> Option<Square> {
        let player = match self.get(pos) {
            Cell::One => Player::One,
            Cell::Two => Player::Two,
            Cell::Empty => return None,
        };
        for other in self.marks(player) {
            if other == pos {
                continue;
            }
            // Both directions of the side cover both rotations.
            if let Some(square) = self.square_on_side(pos, other, player) {
                return Some(square);
            }
            if let Some(square) = self.square_on_side(other, pos, player) {
                return Some(square);
            }
        }
        None
    }

    /// Treat p1 -> p2 as one side and look for the two vertices obtained by
    /// rotating the side vector by +90 degrees: p2 + rot90(d) and p1 + rot90(d).
    fn square_on_side(&self, p1: Position, p2: Position, player: Player) -> Option<Square> {
        let dx = p2.x as isize - p1.x as isize;
        let dy = p2.y as isize - p1.y as isize;
        // rot90(dx, dy) = (-dy, dx)
        let p3 = self.offset(p2, -dy, dx)?;
        let p4 = self.offset(p1, -dy, dx)?;
        let cell = player.to_cell();
        if self.get(p3) == cell && self.get(p4) == cell {
            Some([p1, p2, p3, p4])
        } else {
            None
        }
    }

    fn offset(&self, pos: Position, dx: isize, dy: isize) -> Option<Position> {
        let x = pos.x as isize + dx;
        let y = pos.y as isize + dy;
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return None;
        }
        Some(Position::new(x as usize, y as usize))
    }
}
