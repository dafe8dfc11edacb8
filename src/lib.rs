//! Slider-TD: a self-learning agent for the Slider board game.
//!
//! Two players race their pieces across an N×N board: H pieces exit off
//! the right edge, V pieces off the top. The agent searches with
//! depth-limited alpha-beta minimax, scores cutoff positions with a
//! weighted-feature evaluation squashed through `tanh`, and tunes its
//! weights after each game with TD-Leaf(lambda).
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, search and learning defaults
//! - [`error`] - The crate error type
//! - [`board`] - Board state, pieces and text format
//! - [`moves`] - Move generation and application
//! - [`eval`] - Feature extraction and evaluation
//! - [`weights`] - Weight vectors and their files
//! - [`search`] - Alpha-beta search and iterative deepening
//! - [`tdleaf`] - TD-Leaf(lambda) weight updates
//! - [`config`] - Agent settings
//! - [`agent`] - The per-game agent
//! - [`selfplay`] - Refereed games for training
//! - [`protocol`] - Text protocol for an external referee
//!
//! ## Example
//!
//! ```
//! use slider_td::agent::Agent;
//! use slider_td::config::AgentConfig;
//! use slider_td::moves::str_move;
//!
//! let board = "+ + H +\nH + + +\nH + V +\n+ + V V\n";
//! let mut agent = Agent::init(4, board, 'H', AgentConfig::default().with_depth(3)).unwrap();
//! let mv = agent.make_move().unwrap();
//! println!("H plays {}", str_move(mv));
//! ```

pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod eval;
pub mod moves;
pub mod protocol;
pub mod search;
pub mod selfplay;
pub mod tdleaf;
pub mod weights;
