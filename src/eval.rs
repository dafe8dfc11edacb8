//! Static evaluation of Slider positions.
//!
//! An [`Evaluator`] scores a board from one player's point of view. It turns
//! the board into a fixed-order feature vector, takes the weighted sum and
//! squashes it with `tanh(shrink * sum)`.
//!
//! Feature order (all differentials are own minus opponent unless noted):
//!
//! 0. piece-count differential
//! 1. distance differential: opponent summed distance minus own summed
//!    distance, so with a positive weight being closer to the goal scores
//!    higher
//! 2. forward-move advantage: forward moves per piece, own minus opponent,
//!    scaled by `N - 1`
//! 3. ([`FeatureSet::Histogram`] only) for each distance bucket `d` in
//!    `0..N`, the own count then the opponent count of pieces at `d`
//!
//! Positions where a side has no pieces bypass the features entirely and
//! score exactly +1 (opponent has none) or -1 (we have none).

use std::fmt;

use log::warn;

use crate::board::{Board, Cell, Player};
use crate::constants::DEFAULT_BASIC_WEIGHTS;
use crate::error::{Result, SliderError};
use crate::moves::Direction;
use crate::weights::Weights;

/// Largest magnitude a non-terminal evaluation may take.
const NON_TERMINAL_BOUND: f64 = 1.0 - f64::EPSILON;

/// Number of features every feature set starts with.
pub const BASIC_FEATURES: usize = 3;

/// Which features the evaluator extracts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FeatureSet {
    /// Piece, distance and forward-move differentials.
    #[default]
    Basic,
    /// The basic features followed by per-player distance histograms.
    Histogram,
}

impl FeatureSet {
    /// Feature vector length on a board of the given size.
    pub fn len(self, size: usize) -> usize {
        match self {
            FeatureSet::Basic => BASIC_FEATURES,
            FeatureSet::Histogram => BASIC_FEATURES + 2 * size,
        }
    }

    /// Starting weights: the basic defaults, then zeros.
    pub fn default_weights(self, size: usize) -> Weights {
        let mut values = DEFAULT_BASIC_WEIGHTS.to_vec();
        values.resize(self.len(size), 0.0);
        Weights::new(values).unwrap_or_else(|_| unreachable!("default weights are finite"))
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSet::Basic => write!(f, "basic"),
            FeatureSet::Histogram => write!(f, "histogram"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Evaluator {
    player: Player,
    feature_set: FeatureSet,
    shrink: f64,
}

impl Evaluator {
    pub fn new(player: Player, feature_set: FeatureSet, shrink: f64) -> Self {
        Self {
            player,
            feature_set,
            shrink,
        }
    }

    #[inline]
    pub fn player(&self) -> Player {
        self.player
    }

    #[inline]
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    /// Fail unless `weights` has one entry per feature on this board size.
    pub fn check_weights(&self, size: usize, weights: &Weights) -> Result<()> {
        let expected = self.feature_set.len(size);
        if weights.len() != expected {
            return Err(SliderError::WeightCount {
                expected,
                found: weights.len(),
            });
        }
        Ok(())
    }

    /// +1 / -1 when one side has run out of pieces.
    pub fn terminal_value(&self, board: &Board) -> Option<f64> {
        if board.piece_count(self.player.opponent()) == 0 {
            Some(1.0)
        } else if board.piece_count(self.player) == 0 {
            Some(-1.0)
        } else {
            None
        }
    }

    /// Extract the feature vector of `board`.
    pub fn features(&self, board: &Board) -> Vec<f64> {
        let me = self.player;
        let opp = me.opponent();
        let n = board.size();

        let mut features = Vec::with_capacity(self.feature_set.len(n));
        features.push(board.piece_count(me) as f64 - board.piece_count(opp) as f64);
        features.push(sum_distances(board, opp) - sum_distances(board, me));
        let forward = forward_ratio(board, me) - forward_ratio(board, opp);
        features.push(forward * (n as f64 - 1.0));

        if self.feature_set == FeatureSet::Histogram {
            let own = distance_histogram(board, me);
            let theirs = distance_histogram(board, opp);
            for d in 0..n {
                features.push(own[d]);
                features.push(theirs[d]);
            }
        }
        features
    }

    /// Evaluate `board` in `[-1, 1]`.
    pub fn evaluate(&self, board: &Board, weights: &Weights) -> f64 {
        if let Some(v) = self.terminal_value(board) {
            return v;
        }
        self.squash(weights.dot(&self.features(board)))
    }

    /// Evaluate from an already extracted feature vector.
    pub fn score(&self, board: &Board, features: &[f64], weights: &Weights) -> f64 {
        if let Some(v) = self.terminal_value(board) {
            return v;
        }
        self.squash(weights.dot(features))
    }

    /// `tanh(shrink * sum)`, kept strictly inside (-1, 1).
    pub fn squash(&self, sum: f64) -> f64 {
        let v = (sum * self.shrink).tanh();
        if v.is_nan() {
            warn!("weighted feature sum is not a number; scoring as 0");
            return 0.0;
        }
        v.clamp(-NON_TERMINAL_BOUND, NON_TERMINAL_BOUND)
    }

    /// Forward finite difference of the evaluation with respect to weight
    /// `i`, holding the other weights fixed. Terminal positions do not
    /// depend on the weights, so their derivative is 0.
    pub fn partial_derivative(
        &self,
        board: &Board,
        features: &[f64],
        weights: &Weights,
        i: usize,
        step: f64,
    ) -> f64 {
        if self.terminal_value(board).is_some() {
            return 0.0;
        }
        let Some(&f_i) = features.get(i) else {
            return 0.0;
        };
        let sum = weights.dot(features);
        let base = (sum * self.shrink).tanh();
        let nudged = ((sum + step * f_i) * self.shrink).tanh();
        let d = (nudged - base) / step;
        if d.is_finite() { d } else { 0.0 }
    }
}

fn sum_distances(board: &Board, player: Player) -> f64 {
    let n = board.size();
    board
        .pieces(player)
        .iter()
        .map(|p| p.distance_to_goal(n) as f64)
        .sum()
}

/// Forward moves per live piece; 0 when the player has no pieces.
fn forward_ratio(board: &Board, player: Player) -> f64 {
    let pieces = board.piece_count(player);
    let forward = Direction::forward(player);
    let count = board
        .legal_moves(player)
        .iter()
        .filter(|m| m.dir == forward)
        .count();
    let ratio = count as f64 / pieces as f64;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// Piece counts bucketed by exact distance to goal, bucket `d` holding the
/// pieces `d + 1` forward moves away.
fn distance_histogram(board: &Board, player: Player) -> Vec<f64> {
    let n = board.size();
    let mut buckets = vec![0.0; n];
    for piece in board.pieces(player) {
        debug_assert_ne!(piece.cell, Cell::Empty);
        let d = piece.distance_to_goal(n) - 1;
        buckets[d] += 1.0;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "+ + H +\nH + + +\nH + V +\n+ + V V\n";

    #[test]
    fn test_basic_features() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 1.0);
        let f = eval.features(&board);
        assert_eq!(f.len(), 3);
        assert_eq!(f[0], 0.0);
        // H distances 2 + 4 + 4, V distances 3 + 4 + 4.
        assert_eq!(f[1], 1.0);
        // Every H piece can step right; two of three V pieces can step up.
        assert!((f[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_is_zero_filled() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Histogram, 1.0);
        let f = eval.features(&board);
        assert_eq!(f.len(), 3 + 2 * 4);
        // Buckets 0..4 interleaved own/opp; H has one piece at bucket 1 and
        // two at bucket 3, V one at bucket 2 and two at bucket 3.
        assert_eq!(&f[3..], &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_terminal_values_ignore_weights() {
        let board: Board = "+ + +\n+ V +\n+ + +\n".parse().unwrap();
        let weights = Weights::new(vec![100.0, -50.0, 3.0]).unwrap();
        let as_v = Evaluator::new(Player::V, FeatureSet::Basic, 1.0);
        let as_h = Evaluator::new(Player::H, FeatureSet::Basic, 1.0);
        assert_eq!(as_v.evaluate(&board, &weights), 1.0);
        assert_eq!(as_h.evaluate(&board, &weights), -1.0);
    }

    #[test]
    fn test_forward_ratio_without_pieces_is_zero() {
        let board: Board = "+ + +\n+ V +\n+ + +\n".parse().unwrap();
        let eval = Evaluator::new(Player::V, FeatureSet::Basic, 1.0);
        let f = eval.features(&board);
        assert!(f.iter().all(|x| x.is_finite()));
        // One V piece with one forward move, scaled by N - 1 = 2.
        assert_eq!(f[2], 2.0);
    }

    #[test]
    fn test_evaluation_is_strictly_bounded() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 1.0);
        let huge = Weights::new(vec![1e6, 1e6, 1e6]).unwrap();
        let v = eval.evaluate(&board, &huge);
        assert!(v > -1.0 && v < 1.0);
    }

    #[test]
    fn test_partial_derivative_matches_analytic() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(4);
        let f = eval.features(&board);
        let sum = weights.dot(&f);
        for i in 0..3 {
            let analytic = 0.2 * f[i] * (1.0 - (0.2 * sum).tanh().powi(2));
            let numeric = eval.partial_derivative(&board, &f, &weights, i, 1e-4);
            assert!((analytic - numeric).abs() < 1e-4, "weight {i}: {analytic} vs {numeric}");
        }
    }

    #[test]
    fn test_weight_count_check() {
        let eval = Evaluator::new(Player::H, FeatureSet::Histogram, 1.0);
        assert!(eval.check_weights(5, &FeatureSet::Histogram.default_weights(5)).is_ok());
        assert!(matches!(
            eval.check_weights(5, &FeatureSet::Basic.default_weights(5)),
            Err(SliderError::WeightCount { expected: 13, found: 3 })
        ));
    }
}
