//! Minimax search with alpha-beta pruning.
//!
//! The tree alternates between the evaluating player (maximizing, even
//! plies) and the opponent (minimizing, odd plies). Every node works on its
//! own copy of the board, so branches never share state.
//!
//! A node is a cutoff (leaf) when the depth limit is reached, when the side
//! to move has no legal moves, or when either side has no pieces left. Only
//! leaves are evaluated. Each leaf yields a [`PrincipalVariation`]; interior
//! nodes pass up the variation of whichever child is currently best, so the
//! root ends up holding the leaf of the line it chose.
//!
//! Ties keep the earliest move in generation order.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::board::{Board, Player};
use crate::error::{Result, SliderError};
use crate::eval::Evaluator;
use crate::moves::{Move, apply_move};
use crate::weights::Weights;

/// The leaf a search decision rests on: the board, its features and its
/// evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct PrincipalVariation {
    pub board: Board,
    pub features: Vec<f64>,
    pub value: f64,
}

/// How deep to search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchLimits {
    /// One pass with a fixed cutoff ply.
    Fixed { depth: usize },
    /// Iterative deepening from `base_depth`, one ply at a time, while the
    /// elapsed time is below `budget` and the depth below `max_depth`.
    Timed {
        base_depth: usize,
        budget: Duration,
        max_depth: usize,
    },
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    /// `None` when the player has no legal move (a pass).
    pub best_move: Option<Move>,
    pub value: f64,
    /// Leaf of the chosen line; `None` for a pass.
    pub variation: Option<PrincipalVariation>,
    /// Depth of the last completed iteration.
    pub depth: usize,
    /// Nodes visited, over all iterations.
    pub nodes: u64,
}

/// Per-node hook for tracing the tree.
pub trait SearchObserver {
    /// Called after the child reached by `mv` at ply `depth` returned
    /// `value` (from the evaluating player's point of view).
    fn on_node(&mut self, depth: usize, mv: Move, value: f64);
}

/// Observer that writes every node to the `trace` log level.
#[derive(Debug, Default)]
pub struct LogObserver;

impl SearchObserver for LogObserver {
    fn on_node(&mut self, depth: usize, mv: Move, value: f64) {
        trace!("{:indent$}ply {depth} {mv} -> {value:.4}", "", indent = depth * 2);
    }
}

pub struct Searcher<'a> {
    evaluator: &'a Evaluator,
    weights: &'a Weights,
    observer: Option<&'a mut dyn SearchObserver>,
    nodes: u64,
    hit_depth_limit: bool,
}

impl<'a> Searcher<'a> {
    pub fn new(evaluator: &'a Evaluator, weights: &'a Weights) -> Self {
        Self {
            evaluator,
            weights,
            observer: None,
            nodes: 0,
            hit_depth_limit: false,
        }
    }

    pub fn with_observer(mut self, observer: &'a mut dyn SearchObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run a search under the given limits.
    pub fn search(&mut self, board: &Board, limits: &SearchLimits) -> Result<SearchResult> {
        match *limits {
            SearchLimits::Fixed { depth } => self.alpha_beta(board, depth),
            SearchLimits::Timed {
                base_depth,
                budget,
                max_depth,
            } => self.iterative_deepening(board, base_depth, budget, max_depth),
        }
    }

    /// Alpha-beta minimax decision with the given cutoff ply.
    pub fn alpha_beta(&mut self, board: &Board, depth: usize) -> Result<SearchResult> {
        self.decide(board, depth, true)
    }

    /// The same decision without pruning. Visits the whole tree.
    pub fn minimax_unpruned(&mut self, board: &Board, depth: usize) -> Result<SearchResult> {
        self.decide(board, depth, false)
    }

    /// Re-run the alpha-beta decision at increasing depth while time remains.
    ///
    /// The clock is only read between iterations: an iteration that has
    /// started always completes, and its result replaces the previous one.
    /// Deepening also stops once an iteration reached no depth cutoff, since
    /// a deeper pass would explore the same tree.
    pub fn iterative_deepening(
        &mut self,
        board: &Board,
        base_depth: usize,
        budget: Duration,
        max_depth: usize,
    ) -> Result<SearchResult> {
        let start = Instant::now();
        let first_nodes = self.nodes;
        let mut depth = base_depth.max(1);
        let mut result = self.decide(board, depth, true)?;

        while start.elapsed() < budget && depth < max_depth {
            if result.best_move.is_none() || !self.hit_depth_limit {
                break;
            }
            depth += 1;
            result = self.decide(board, depth, true)?;
            debug!(
                "depth {depth}: {} value {:.4} after {:?}",
                crate::moves::str_move(result.best_move),
                result.value,
                start.elapsed()
            );
        }
        result.nodes = self.nodes - first_nodes;
        Ok(result)
    }

    fn decide(&mut self, board: &Board, max_depth: usize, prune: bool) -> Result<SearchResult> {
        let max_depth = max_depth.max(1);
        let first_nodes = self.nodes;
        self.hit_depth_limit = false;
        self.nodes += 1;

        let me = self.evaluator.player();
        let moves = board.legal_moves(me);
        if moves.is_empty() || board.is_game_over() {
            return Ok(SearchResult {
                best_move: None,
                value: self.evaluator.evaluate(board, self.weights),
                variation: None,
                depth: max_depth,
                nodes: 1,
            });
        }

        let mut best: Option<(Move, PrincipalVariation)> = None;
        for &mv in moves {
            let alpha = match (&best, prune) {
                (Some((_, pv)), true) => pv.value,
                _ => f64::NEG_INFINITY,
            };
            let child = apply_move(board, Some(mv))?;
            let pv = self.min_value(child, 1, max_depth, alpha, f64::INFINITY, prune)?;
            self.observe(0, mv, pv.value);
            if best.as_ref().is_none_or(|(_, b)| pv.value > b.value) {
                best = Some((mv, pv));
            }
        }

        let (mv, pv) = best.ok_or_else(|| SliderError::Internal("root has no moves".into()))?;
        Ok(SearchResult {
            best_move: Some(mv),
            value: pv.value,
            variation: Some(pv),
            depth: max_depth,
            nodes: self.nodes - first_nodes,
        })
    }

    fn max_value(
        &mut self,
        board: Board,
        depth: usize,
        max_depth: usize,
        mut alpha: f64,
        beta: f64,
        prune: bool,
    ) -> Result<PrincipalVariation> {
        self.nodes += 1;
        let me = self.evaluator.player();
        if self.is_cutoff(&board, me, depth, max_depth) {
            return Ok(self.leaf(board));
        }

        let mut best: Option<PrincipalVariation> = None;
        for &mv in board.legal_moves(me) {
            let child = apply_move(&board, Some(mv))?;
            let pv = self.min_value(child, depth + 1, max_depth, alpha, beta, prune)?;
            self.observe(depth, mv, pv.value);
            if best.as_ref().is_none_or(|b| pv.value > b.value) {
                best = Some(pv);
            }
            let value = best.as_ref().map_or(f64::NEG_INFINITY, |b| b.value);
            if prune {
                if value >= beta {
                    break;
                }
                alpha = alpha.max(value);
            }
        }
        best.ok_or_else(|| SliderError::Internal("max node without moves".into()))
    }

    fn min_value(
        &mut self,
        board: Board,
        depth: usize,
        max_depth: usize,
        alpha: f64,
        mut beta: f64,
        prune: bool,
    ) -> Result<PrincipalVariation> {
        self.nodes += 1;
        let opp = self.evaluator.player().opponent();
        if self.is_cutoff(&board, opp, depth, max_depth) {
            return Ok(self.leaf(board));
        }

        let mut best: Option<PrincipalVariation> = None;
        for &mv in board.legal_moves(opp) {
            let child = apply_move(&board, Some(mv))?;
            let pv = self.max_value(child, depth + 1, max_depth, alpha, beta, prune)?;
            self.observe(depth, mv, pv.value);
            if best.as_ref().is_none_or(|b| pv.value < b.value) {
                best = Some(pv);
            }
            let value = best.as_ref().map_or(f64::INFINITY, |b| b.value);
            if prune {
                if value <= alpha {
                    break;
                }
                beta = beta.min(value);
            }
        }
        best.ok_or_else(|| SliderError::Internal("min node without moves".into()))
    }

    fn is_cutoff(&mut self, board: &Board, to_move: Player, depth: usize, max_depth: usize) -> bool {
        if board.is_game_over() || board.legal_moves(to_move).is_empty() {
            return true;
        }
        if depth >= max_depth {
            self.hit_depth_limit = true;
            return true;
        }
        false
    }

    fn leaf(&self, board: Board) -> PrincipalVariation {
        let features = self.evaluator.features(&board);
        let value = self.evaluator.score(&board, &features, self.weights);
        PrincipalVariation {
            board,
            features,
            value,
        }
    }

    fn observe(&mut self, depth: usize, mv: Move, value: f64) {
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.on_node(depth, mv, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::FeatureSet;
    use crate::moves::Direction;

    const SAMPLE: &str = "+ + H +\nH + + +\nH + V +\n+ + V V\n";

    #[derive(Default)]
    struct CountingObserver {
        calls: usize,
        max_depth_seen: usize,
    }

    impl SearchObserver for CountingObserver {
        fn on_node(&mut self, depth: usize, _mv: Move, value: f64) {
            assert!((-1.0..=1.0).contains(&value));
            self.calls += 1;
            self.max_depth_seen = self.max_depth_seen.max(depth);
        }
    }

    #[test]
    fn test_no_moves_is_a_pass() {
        let board: Board = "B B +\nH B +\nB + V\n".parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(3);
        let result = Searcher::new(&eval, &weights).alpha_beta(&board, 3).unwrap();
        assert_eq!(result.best_move, None);
        assert!(result.variation.is_none());
    }

    #[test]
    fn test_ties_keep_first_generated_move() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let zero = Weights::new(vec![0.0; 3]).unwrap();
        let result = Searcher::new(&eval, &zero).alpha_beta(&board, 3).unwrap();
        assert_eq!(result.best_move, Some(board.legal_moves(Player::H)[0]));
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_variation_carries_chosen_value() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(4);
        let result = Searcher::new(&eval, &weights).alpha_beta(&board, 3).unwrap();
        let pv = result.variation.unwrap();
        assert_eq!(pv.value, result.value);
        assert_eq!(pv.value, eval.score(&pv.board, &pv.features, &weights));
        assert!(pv.board.is_consistent());
    }

    #[test]
    fn test_one_ply_picks_best_child() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(4);
        let result = Searcher::new(&eval, &weights).alpha_beta(&board, 1).unwrap();

        let mut best = f64::NEG_INFINITY;
        let mut best_move = None;
        for &mv in board.legal_moves(Player::H) {
            let child = apply_move(&board, Some(mv)).unwrap();
            let v = eval.evaluate(&child, &weights);
            if v > best {
                best = v;
                best_move = Some(mv);
            }
        }
        assert_eq!(result.best_move, best_move);
        assert_eq!(result.value, best);
    }

    #[test]
    fn test_observer_sees_every_ply() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::V, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(4);
        let mut obs = CountingObserver::default();
        let mut searcher = Searcher::new(&eval, &weights).with_observer(&mut obs);
        searcher.minimax_unpruned(&board, 3).unwrap();
        drop(searcher);
        assert!(obs.calls > board.legal_moves(Player::V).len());
        assert_eq!(obs.max_depth_seen, 2);
    }

    #[test]
    fn test_iterative_deepening_respects_ceiling() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(4);
        let limits = SearchLimits::Timed {
            base_depth: 1,
            budget: Duration::from_secs(60),
            max_depth: 3,
        };
        let result = Searcher::new(&eval, &weights).search(&board, &limits).unwrap();
        assert_eq!(result.depth, 3);

        let fixed = Searcher::new(&eval, &weights).alpha_beta(&board, 3).unwrap();
        assert_eq!(result.best_move, fixed.best_move);
        assert_eq!(result.value, fixed.value);
    }

    #[test]
    fn test_iterative_deepening_runs_base_depth_with_zero_budget() {
        let board: Board = SAMPLE.parse().unwrap();
        let eval = Evaluator::new(Player::H, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(4);
        let result = Searcher::new(&eval, &weights)
            .iterative_deepening(&board, 2, Duration::ZERO, 10)
            .unwrap();
        assert_eq!(result.depth, 2);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_forced_exit_is_found() {
        // H's only piece is boxed in at the right edge and must exit, which
        // leaves H without pieces: a win for V two plies ahead.
        let board: Board = "+ + B\nV + H\n+ + B\n".parse().unwrap();
        let eval = Evaluator::new(Player::V, FeatureSet::Basic, 0.2);
        let weights = FeatureSet::Basic.default_weights(3);
        let result = Searcher::new(&eval, &weights).alpha_beta(&board, 2).unwrap();
        assert_eq!(result.value, 1.0);
        // Both V moves win; the first generated one is kept.
        assert_eq!(result.best_move, Some(Move::new(0, 1, Direction::Up)));
    }
}
