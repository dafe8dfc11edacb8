//! Move generation and board transitions.
//!
//! Each piece is checked in the fixed direction order Up, Right, Left, Down.
//! Both piece kinds may move Up and Right; H may also move Down and V may
//! also move Left. A forward move off the goal edge removes the piece.
//!
//! Generation order matters: the search keeps the first of several equally
//! valued moves, so the same board must always yield the same move list.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::board::{Board, Cell, Coord, Piece, Player};
use crate::error::{Result, SliderError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Cartesian offset `(dx, dy)` of one step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    /// The direction that advances `player` toward its goal edge.
    pub fn forward(player: Player) -> Self {
        match player {
            Player::H => Direction::Right,
            Player::V => Direction::Up,
        }
    }
}

/// A move: the piece at `from` slides one cell in `dir`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Coord,
    pub dir: Direction,
}

impl Move {
    pub const fn new(x: usize, y: usize, dir: Direction) -> Self {
        Self {
            from: Coord::new(x, y),
            dir,
        }
    }

    /// Destination, possibly off the board.
    pub fn target(&self) -> (isize, isize) {
        let (dx, dy) = self.dir.offset();
        (self.from.x as isize + dx, self.from.y as isize + dy)
    }

    pub fn is_forward_for(&self, player: Player) -> bool {
        self.dir == Direction::forward(player)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.from.x, self.from.y, self.dir.symbol())
    }
}

impl FromStr for Move {
    type Err = SliderError;

    /// Parse `x,y,D` where `D` is one of `U`, `D`, `L`, `R`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || SliderError::MoveSyntax(s.to_string());
        let parts: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        let [x, y, d] = parts.as_slice() else {
            return Err(bad());
        };
        let x = x.parse::<usize>().map_err(|_| bad())?;
        let y = y.parse::<usize>().map_err(|_| bad())?;
        let mut chars = d.chars();
        let dir = match (chars.next(), chars.next()) {
            (Some(c), None) => Direction::from_symbol(c).ok_or_else(bad)?,
            _ => return Err(bad()),
        };
        Ok(Move::new(x, y, dir))
    }
}

/// Parse a move or the literal `pass` (case-insensitive) as `None`.
pub fn parse_move(s: &str) -> Result<Option<Move>> {
    if s.trim().eq_ignore_ascii_case("pass") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Format an optional move, `None` as `pass`.
pub fn str_move(mv: Option<Move>) -> String {
    match mv {
        Some(m) => m.to_string(),
        None => "pass".into(),
    }
}

/// Generate every legal move of `player` from the grid.
///
/// Moves come out in piece-list order, then Up, Right, Left, Down per piece.
pub fn legal_moves(board: &Board, player: Player) -> Vec<Move> {
    let mut moves = Vec::with_capacity(board.piece_count(player) * 3);
    for piece in board.pieces(player) {
        piece_moves(board, player, piece, &mut moves);
    }
    moves
}

fn piece_moves(board: &Board, player: Player, piece: &Piece, out: &mut Vec<Move>) {
    let n = board.size();
    let Coord { x, y } = piece.coord(n);
    let empty = |cx: usize, cy: usize| board.get(Coord::new(cx, cy)).is_empty();

    // Up: V exits off the top row; otherwise the cell above must be empty.
    if (y == n - 1 && player == Player::V) || (y < n - 1 && empty(x, y + 1)) {
        out.push(Move::new(x, y, Direction::Up));
    }
    // Right: H exits off the right column; otherwise the cell must be empty.
    if (x == n - 1 && player == Player::H) || (x < n - 1 && empty(x + 1, y)) {
        out.push(Move::new(x, y, Direction::Right));
    }
    // H never moves left.
    if player == Player::V && x > 0 && empty(x - 1, y) {
        out.push(Move::new(x, y, Direction::Left));
    }
    // V never moves down.
    if player == Player::H && y > 0 && empty(x, y - 1) {
        out.push(Move::new(x, y, Direction::Down));
    }
}

impl Board {
    /// Play a move on this board in place, then refresh both move caches.
    ///
    /// A forward move off the goal edge removes the piece. Moving from a
    /// cell without a piece, or onto an occupied cell, is an internal error:
    /// generated moves never do either.
    pub fn play(&mut self, mv: Move) -> Result<()> {
        let cell = self.get(mv.from);
        let Some(owner) = cell.owner() else {
            return Err(SliderError::NotAPiece(mv.from));
        };
        let (row, col) = self.array_pos(mv.from);
        let (tx, ty) = mv.target();

        if !self.contains(tx, ty) {
            if !mv.is_forward_for(owner) {
                warn!("move {mv} leaves the board sideways for {owner}; ignoring");
                return Ok(());
            }
            remove_piece(self.pieces_mut(owner), row, col, mv)?;
            self.set(mv.from, Cell::Empty);
            self.refresh_moves();
            return Ok(());
        }

        let to = Coord::new(tx as usize, ty as usize);
        if !self.get(to).is_empty() {
            return Err(SliderError::Internal(format!(
                "move {mv} lands on occupied cell {to}"
            )));
        }
        let (new_row, new_col) = self.array_pos(to);
        let pieces = self.pieces_mut(owner);
        remove_piece(pieces, row, col, mv)?;
        pieces.push(Piece {
            row: new_row,
            col: new_col,
            cell,
        });

        self.set(to, cell);
        self.set(mv.from, Cell::Empty);
        self.refresh_moves();
        Ok(())
    }
}

fn remove_piece(pieces: &mut Vec<Piece>, row: usize, col: usize, mv: Move) -> Result<()> {
    match pieces.iter().position(|p| p.row == row && p.col == col) {
        Some(i) => {
            pieces.remove(i);
            Ok(())
        }
        None => Err(SliderError::Internal(format!(
            "piece list has no entry for the source of {mv}"
        ))),
    }
}

/// Return the board that results from `mv`; `None` is a pass and returns an
/// identical copy.
pub fn apply_move(board: &Board, mv: Option<Move>) -> Result<Board> {
    let mut next = board.clone();
    if let Some(m) = mv {
        next.play(m)?;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "+ + H +\nH + + +\nH + V +\n+ + V V\n";

    #[test]
    fn test_direction_order_per_piece() {
        let board: Board = "+ + +\n+ H +\n+ + +\n".parse().unwrap();
        let moves = legal_moves(&board, Player::H);
        let dirs: Vec<Direction> = moves.iter().map(|m| m.dir).collect();
        assert_eq!(dirs, vec![Direction::Up, Direction::Right, Direction::Down]);

        let board: Board = "+ + +\n+ V +\n+ + +\n".parse().unwrap();
        let dirs: Vec<Direction> = legal_moves(&board, Player::V).iter().map(|m| m.dir).collect();
        assert_eq!(dirs, vec![Direction::Up, Direction::Right, Direction::Left]);
    }

    #[test]
    fn test_goal_edge_exit_is_generated() {
        let board: Board = "+ + H\n+ + +\nV + +\n".parse().unwrap();
        assert!(board.legal_moves(Player::H).contains(&Move::new(2, 2, Direction::Right)));

        let board: Board = "V + +\n+ + +\n+ + H\n".parse().unwrap();
        assert!(board.legal_moves(Player::V).contains(&Move::new(0, 2, Direction::Up)));
    }

    #[test]
    fn test_blocked_cells_stop_moves() {
        let board: Board = "B B +\nH B +\nB + +\n".parse().unwrap();
        assert!(board.legal_moves(Player::H).is_empty());
    }

    #[test]
    fn test_play_relocates_piece() {
        let mut board: Board = SAMPLE.parse().unwrap();
        board.play(Move::new(0, 2, Direction::Right)).unwrap();
        assert_eq!(board.get(Coord::new(0, 2)), Cell::Empty);
        assert_eq!(board.get(Coord::new(1, 2)), Cell::PlayerH);
        // The moved piece is re-appended at the end of its list.
        let last = *board.pieces(Player::H).last().unwrap();
        assert_eq!((last.row, last.col), (1, 1));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_play_exit_removes_piece() {
        let mut board: Board = "+ + H\n+ + +\nV + +\n".parse().unwrap();
        board.play(Move::new(2, 2, Direction::Right)).unwrap();
        assert_eq!(board.piece_count(Player::H), 0);
        assert_eq!(board.get(Coord::new(2, 2)), Cell::Empty);
        assert!(board.is_game_over());
        assert!(board.is_consistent());
    }

    #[test]
    fn test_play_sideways_off_board_is_ignored() {
        let text = "+ + +\n+ + +\nH + V\n";
        let mut board: Board = text.parse().unwrap();
        let before = board.clone();
        // H at the bottom row stepping down, V at the right column stepping right.
        board.play(Move::new(0, 0, Direction::Down)).unwrap();
        board.play(Move::new(2, 0, Direction::Right)).unwrap();
        assert_eq!(board, before);
        assert_eq!(board.to_string(), text);
        assert!(board.is_consistent());
        assert_eq!(apply_move(&before, Some(Move::new(0, 0, Direction::Down))).unwrap(), before);
    }

    #[test]
    fn test_play_from_empty_cell_fails() {
        let mut board: Board = SAMPLE.parse().unwrap();
        let err = board.play(Move::new(1, 1, Direction::Up)).unwrap_err();
        assert!(matches!(err, SliderError::NotAPiece(_)));
    }

    #[test]
    fn test_play_onto_occupied_cell_fails() {
        let mut board: Board = SAMPLE.parse().unwrap();
        let err = board.play(Move::new(2, 0, Direction::Right)).unwrap_err();
        assert!(matches!(err, SliderError::Internal(_)));
    }

    #[test]
    fn test_apply_pass_is_identity() {
        let board: Board = SAMPLE.parse().unwrap();
        assert_eq!(apply_move(&board, None).unwrap(), board);
    }

    #[test]
    fn test_move_text_roundtrip() {
        let mv = Move::new(3, 1, Direction::Left);
        assert_eq!(mv.to_string(), "3,1,L");
        assert_eq!("3,1,L".parse::<Move>().unwrap(), mv);
        assert_eq!(parse_move("PASS").unwrap(), None);
        assert!("3,1".parse::<Move>().is_err());
        assert!("3,1,Q".parse::<Move>().is_err());
        assert!("a,1,U".parse::<Move>().is_err());
        assert_eq!(str_move(None), "pass");
    }
}
