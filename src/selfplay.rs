//! Refereed games between two competitors.
//!
//! Training runs pit an [`Agent`] against another agent or against a
//! [`RandomMover`]. The referee keeps its own copy of the board, checks
//! every reported move against it, and forwards each move to the other side.

use log::{debug, info};

use crate::agent::Agent;
use crate::board::{Board, Player};
use crate::error::{Result, SliderError};
use crate::moves::{Move, str_move};

/// Anything that can sit at the board: it reports its moves and hears the
/// opponent's.
pub trait Competitor {
    fn player(&self) -> Player;
    fn board(&self) -> &Board;
    /// The opponent played `mv` (`None` for a pass).
    fn update(&mut self, mv: Option<Move>) -> Result<()>;
    /// Choose and play our move; `None` passes.
    fn make_move(&mut self) -> Result<Option<Move>>;
}

impl Competitor for Agent {
    fn player(&self) -> Player {
        Agent::player(self)
    }

    fn board(&self) -> &Board {
        Agent::board(self)
    }

    fn update(&mut self, mv: Option<Move>) -> Result<()> {
        Agent::update(self, mv)
    }

    fn make_move(&mut self) -> Result<Option<Move>> {
        Agent::make_move(self)
    }
}

/// Plays a uniformly random legal move.
pub struct RandomMover {
    player: Player,
    board: Board,
    rng: fastrand::Rng,
}

impl RandomMover {
    pub fn new(board: Board, player: Player, seed: u64) -> Self {
        Self {
            player,
            board,
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Competitor for RandomMover {
    fn player(&self) -> Player {
        self.player
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn update(&mut self, mv: Option<Move>) -> Result<()> {
        if let Some(m) = mv {
            self.board.play(m)?;
        }
        Ok(())
    }

    fn make_move(&mut self) -> Result<Option<Move>> {
        let moves = self.board.legal_moves(self.player);
        if moves.is_empty() || self.board.is_game_over() {
            return Ok(None);
        }
        let mv = moves[self.rng.usize(..moves.len())];
        self.board.play(mv)?;
        Ok(Some(mv))
    }
}

/// The usual opening: H pieces down the left column and V pieces along the
/// bottom row, with the bottom-left corner left empty.
pub fn starting_board(size: usize) -> Result<Board> {
    let mut text = String::new();
    for row in 0..size {
        let tokens: Vec<&str> = (0..size)
            .map(|col| match (row, col) {
                (r, 0) if r + 1 < size => "H",
                (r, c) if r + 1 == size && c > 0 => "V",
                _ => "+",
            })
            .collect();
        text.push_str(&tokens.join(" "));
        text.push('\n');
    }
    Board::parse(size, &text)
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameOutcome {
    /// The side with pieces left when the other ran out; `None` for a draw.
    pub winner: Option<Player>,
    /// Moves and passes made.
    pub turns: usize,
    pub board: Board,
}

/// Play one game to the end. H moves first whichever argument holds it.
///
/// The game stops when a side has no pieces, when both sides pass in a row,
/// or after `max_turns` turns; the last two are draws.
pub fn play_game<A, B>(first: &mut A, second: &mut B, max_turns: usize) -> Result<GameOutcome>
where
    A: Competitor + ?Sized,
    B: Competitor + ?Sized,
{
    if first.player() == second.player() {
        return Err(SliderError::Internal(format!(
            "both competitors play {}",
            first.player()
        )));
    }
    if first.board() != second.board() {
        return Err(SliderError::Internal(
            "competitors start from different boards".to_string(),
        ));
    }

    let mut referee = first.board().clone();
    let mut to_move = Player::H;
    let mut passes = 0;
    let mut turns = 0;

    while turns < max_turns && passes < 2 && !referee.is_game_over() {
        let first_moves = to_move == first.player();
        let mv = if first_moves {
            first.make_move()?
        } else {
            second.make_move()?
        };
        match mv {
            Some(m) => {
                if !referee.legal_moves(to_move).contains(&m) {
                    return Err(SliderError::IllegalMove { mv: m, player: to_move });
                }
                referee.play(m)?;
                passes = 0;
            }
            None => passes += 1,
        }
        debug!("turn {turns}: {to_move} {}", str_move(mv));
        if first_moves {
            second.update(mv)?;
        } else {
            first.update(mv)?;
        }

        turns += 1;
        to_move = to_move.opponent();
    }

    let winner = if referee.piece_count(Player::H) == 0 {
        Some(Player::V)
    } else if referee.piece_count(Player::V) == 0 {
        Some(Player::H)
    } else {
        None
    };
    match winner {
        Some(p) => info!("{p} wins after {turns} turns"),
        None => info!("draw after {turns} turns"),
    }
    Ok(GameOutcome {
        winner,
        turns,
        board: referee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    const SAMPLE: &str = "+ + H +\nH + + +\nH + V +\n+ + V V\n";

    #[test]
    fn test_starting_board() {
        let board = starting_board(3).unwrap();
        assert_eq!(board.to_string(), "H + +\nH + +\n+ V V\n");
        assert_eq!(board.piece_count(Player::H), 2);
        assert_eq!(board.piece_count(Player::V), 2);
        assert!(matches!(starting_board(1), Err(SliderError::BoardSize(1))));
    }

    #[test]
    fn test_random_mover_is_reproducible() {
        let board: Board = SAMPLE.parse().unwrap();
        let mut a = RandomMover::new(board.clone(), Player::H, 7);
        let mut b = RandomMover::new(board, Player::H, 7);
        for _ in 0..3 {
            assert_eq!(a.make_move().unwrap(), b.make_move().unwrap());
        }
    }

    #[test]
    fn test_random_game_finishes() {
        let board: Board = SAMPLE.parse().unwrap();
        let mut h = RandomMover::new(board.clone(), Player::H, 1);
        let mut v = RandomMover::new(board, Player::V, 2);
        let outcome = play_game(&mut v, &mut h, 500).unwrap();
        assert!(outcome.turns <= 500);
        if let Some(winner) = outcome.winner {
            assert_eq!(outcome.board.piece_count(winner.opponent()), 0);
        }
        assert!(outcome.board.is_consistent());
    }

    #[test]
    fn test_turn_cap_is_a_draw() {
        let board: Board = SAMPLE.parse().unwrap();
        let mut h = RandomMover::new(board.clone(), Player::H, 3);
        let mut v = RandomMover::new(board, Player::V, 4);
        let outcome = play_game(&mut h, &mut v, 1).unwrap();
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_game_ends_when_a_side_runs_out() {
        // H's only move takes its last piece off the board.
        let board: Board = "B B H\nB B B\nV B +\n".parse().unwrap();
        let mut h = Agent::new(
            AgentConfig::default().with_depth(1),
            board.clone(),
            Player::H,
            crate::eval::FeatureSet::Basic.default_weights(3),
        )
        .unwrap();
        let mut v = RandomMover::new(board, Player::V, 5);
        let outcome = play_game(&mut h, &mut v, 10).unwrap();
        assert!(h.is_finished());
        assert_eq!(outcome.winner, Some(Player::V));
        assert_eq!(outcome.turns, 1);
    }

    #[test]
    fn test_same_side_is_rejected() {
        let board: Board = SAMPLE.parse().unwrap();
        let mut a = RandomMover::new(board.clone(), Player::H, 1);
        let mut b = RandomMover::new(board, Player::H, 2);
        assert!(matches!(
            play_game(&mut a, &mut b, 10),
            Err(SliderError::Internal(_))
        ));
    }
}
