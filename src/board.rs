//! Slider board state.
//!
//! The grid is stored row-major with row 0 at the top, exactly as the board
//! text is written. Moves and pieces are addressed with cartesian [`Coord`]s
//! (`y` = 0 is the bottom row); `row = N - 1 - y`, `col = x`.
//!
//! Besides the grid, a [`Board`] keeps one piece list per player and the
//! cached legal-move list of each player. All three are kept consistent by
//! [`Board::play`](crate::moves) and by the parser.

use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{Result, SliderError};
use crate::moves::{Move, legal_moves};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    /// Horizontal: races rightward, exits off the right edge.
    H,
    /// Vertical: races upward, exits off the top edge.
    V,
}

impl Player {
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'H' | 'h' => Ok(Player::H),
            'V' | 'v' => Ok(Player::V),
            other => Err(SliderError::UnknownPlayer(other)),
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Player::H => Player::V,
            Player::V => Player::H,
        }
    }

    /// The cell type this player's pieces occupy.
    pub fn cell(self) -> Cell {
        match self {
            Player::H => Cell::PlayerH,
            Player::V => Cell::PlayerV,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::H => 'H',
            Player::V => 'V',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    PlayerH,
    PlayerV,
    Blocked,
    Empty,
}

impl Cell {
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "H" => Ok(Cell::PlayerH),
            "V" => Ok(Cell::PlayerV),
            "B" => Ok(Cell::Blocked),
            "+" => Ok(Cell::Empty),
            other => Err(SliderError::UnknownCell(other.to_string())),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::PlayerH => 'H',
            Cell::PlayerV => 'V',
            Cell::Blocked => 'B',
            Cell::Empty => '+',
        }
    }

    /// The player whose piece sits in this cell, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::PlayerH => Some(Player::H),
            Cell::PlayerV => Some(Player::V),
            Cell::Blocked | Cell::Empty => None,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Cartesian board coordinate: `x` is the column, `y` counts up from the
/// bottom row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A live piece, addressed by array position.
///
/// Several pieces of the same type coexist, so a piece is identified by its
/// `(row, col)` pair and never by its cell type alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub row: usize,
    pub col: usize,
    pub cell: Cell,
}

impl Piece {
    /// Cartesian coordinate of this piece on a board of the given size.
    pub fn coord(&self, size: usize) -> Coord {
        Coord::new(self.col, size - 1 - self.row)
    }

    /// Number of forward moves this piece needs to leave the board.
    pub fn distance_to_goal(&self, size: usize) -> usize {
        let c = self.coord(size);
        match self.cell {
            Cell::PlayerH => size - c.x,
            Cell::PlayerV => size - c.y,
            Cell::Blocked | Cell::Empty => 0,
        }
    }
}

/// An NxN Slider position.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
    h_pieces: Vec<Piece>,
    v_pieces: Vec<Piece>,
    h_moves: Vec<Move>,
    v_moves: Vec<Move>,
}

impl Board {
    /// Create an empty board.
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(SliderError::BoardSize(size));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
            h_pieces: Vec::new(),
            v_pieces: Vec::new(),
            h_moves: Vec::new(),
            v_moves: Vec::new(),
        })
    }

    /// Parse `size` rows of `size` whitespace-separated cell tokens
    /// (`H`, `V`, `B`, `+`), top row first.
    ///
    /// Piece lists are filled in row-major reading order and both legal-move
    /// caches are computed before returning.
    pub fn parse(size: usize, text: &str) -> Result<Self> {
        let mut board = Self::new(size)?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != size * size {
            return Err(SliderError::BoardShape {
                expected: size * size,
                found: tokens.len(),
            });
        }

        for (i, token) in tokens.iter().enumerate() {
            let cell = Cell::from_token(token)?;
            let (row, col) = (i / size, i % size);
            board.cells[i] = cell;
            match cell.owner() {
                Some(Player::H) => board.h_pieces.push(Piece { row, col, cell }),
                Some(Player::V) => board.v_pieces.push(Piece { row, col, cell }),
                None => {}
            }
        }
        board.refresh_moves();
        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Array `(row, col)` of a cartesian coordinate.
    #[inline]
    pub fn array_pos(&self, c: Coord) -> (usize, usize) {
        (self.size - 1 - c.y, c.x)
    }

    /// Cartesian coordinate of an array `(row, col)`.
    #[inline]
    pub fn coord_of(&self, row: usize, col: usize) -> Coord {
        Coord::new(col, self.size - 1 - row)
    }

    #[inline]
    pub fn contains(&self, x: isize, y: isize) -> bool {
        let n = self.size as isize;
        (0..n).contains(&x) && (0..n).contains(&y)
    }

    /// Cell at a cartesian coordinate. Out-of-range coordinates read as
    /// `Blocked`.
    pub fn get(&self, c: Coord) -> Cell {
        if c.x >= self.size || c.y >= self.size {
            return Cell::Blocked;
        }
        let (row, col) = self.array_pos(c);
        self.cells[self.idx(row, col)]
    }

    /// Cell at an array position.
    pub fn cell_at(&self, row: usize, col: usize) -> Cell {
        self.cells[self.idx(row, col)]
    }

    pub(crate) fn set(&mut self, c: Coord, cell: Cell) {
        let (row, col) = self.array_pos(c);
        let i = self.idx(row, col);
        self.cells[i] = cell;
    }

    pub fn pieces(&self, player: Player) -> &[Piece] {
        match player {
            Player::H => &self.h_pieces,
            Player::V => &self.v_pieces,
        }
    }

    pub(crate) fn pieces_mut(&mut self, player: Player) -> &mut Vec<Piece> {
        match player {
            Player::H => &mut self.h_pieces,
            Player::V => &mut self.v_pieces,
        }
    }

    #[inline]
    pub fn piece_count(&self, player: Player) -> usize {
        self.pieces(player).len()
    }

    /// Cached legal moves of `player`, in generation order.
    pub fn legal_moves(&self, player: Player) -> &[Move] {
        match player {
            Player::H => &self.h_moves,
            Player::V => &self.v_moves,
        }
    }

    /// Recompute both cached legal-move lists from the current grid.
    pub fn refresh_moves(&mut self) {
        self.h_moves = legal_moves(self, Player::H);
        self.v_moves = legal_moves(self, Player::V);
    }

    /// A game is over once either side has no pieces left.
    pub fn is_game_over(&self) -> bool {
        self.h_pieces.is_empty() || self.v_pieces.is_empty()
    }

    /// Check that the grid and both piece lists describe the same pieces.
    pub fn is_consistent(&self) -> bool {
        for player in [Player::H, Player::V] {
            let pieces = self.pieces(player);
            let on_grid = self.cells.iter().filter(|&&c| c == player.cell()).count();
            if on_grid != pieces.len() {
                return false;
            }
            for (i, p) in pieces.iter().enumerate() {
                if p.cell != player.cell() || self.cell_at(p.row, p.col) != p.cell {
                    return false;
                }
                if pieces[..i].iter().any(|q| q.row == p.row && q.col == p.col) {
                    return false;
                }
            }
        }
        true
    }
}

impl FromStr for Board {
    type Err = SliderError;

    /// Parse a board whose size is given by its number of non-blank lines.
    fn from_str(s: &str) -> Result<Self> {
        let size = s.lines().filter(|l| !l.trim().is_empty()).count();
        Self::parse(size, s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.cell_at(row, col).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
