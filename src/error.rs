//! Error type shared by the library.

use std::path::PathBuf;

use thiserror::Error;

use crate::board::{Coord, Player};
use crate::moves::Move;

/// Everything that can go wrong inside the engine.
///
/// `Internal` marks a broken invariant; every other variant is bad input
/// or a misbehaving referee.
#[derive(Debug, Error)]
pub enum SliderError {
    #[error("unknown player type {0:?} (expected 'H' or 'V')")]
    UnknownPlayer(char),

    #[error("unknown cell token {0:?} (expected H, V, B or +)")]
    UnknownCell(String),

    #[error("unsupported board size {0}")]
    BoardSize(usize),

    #[error("board text has {found} cells, expected {expected}")]
    BoardShape { expected: usize, found: usize },

    #[error("malformed move {0:?}")]
    MoveSyntax(String),

    #[error("illegal move {mv} for player {player}")]
    IllegalMove { mv: Move, player: Player },

    #[error("no piece at {0}")]
    NotAPiece(Coord),

    #[error("expected {expected} weights, got {found}")]
    WeightCount { expected: usize, found: usize },

    #[error("invalid weight {0:?}")]
    WeightValue(String),

    #[error("cannot access weights file {path}: {source}")]
    WeightsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SliderError>;
