//! Default engine parameters.
//!
//! These are the values an [`AgentConfig`](crate::config::AgentConfig) starts
//! from. Every one of them can be overridden at runtime from the command line.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest playable board. A 1x1 board has no room for both players.
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest board the text parser accepts.
pub const MAX_BOARD_SIZE: usize = 16;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default cutoff ply for a fixed-depth search.
pub const MAX_DEPTH: usize = 5;

/// First depth tried by the time-budgeted iterative deepening search.
pub const BASE_DEPTH: usize = 4;

/// Depth ceiling for iterative deepening. Beyond this the tree is far larger
/// than any sensible budget allows.
pub const DEEPENING_CEILING: usize = 32;

/// Default wall-clock budget per move for iterative deepening.
pub const MOVE_BUDGET: Duration = Duration::from_millis(200);

// =============================================================================
// Evaluation & TD-Leaf(lambda) Parameters
// =============================================================================

/// Multiplier applied to the weighted feature sum before `tanh`.
pub const SHRINK_FACTOR: f64 = 0.2;

/// Learning rate.
pub const ALPHA: f64 = 1.0;

/// Eligibility decay for future temporal differences.
pub const LAMBDA: f64 = 0.98;

/// Finite-difference step for the per-weight partial derivative.
pub const DERIVATIVE_STEP: f64 = 1e-4;

/// Starting weights for the three basic features:
/// piece differential, distance differential, forward-move advantage.
pub const DEFAULT_BASIC_WEIGHTS: [f64; 3] = [-0.9, 1.0, 1.0];

// =============================================================================
// Self-play
// =============================================================================

/// Turn cap for a self-play game; games reaching it are scored as draws.
pub const MAX_GAME_TURNS: usize = 400;
