//! The per-game Slider agent.
//!
//! An [`Agent`] owns the live board, its weights and the principal
//! variations recorded on each of its turns. The referee drives it with
//! [`Agent::update`] (opponent moved or passed) and [`Agent::make_move`]
//! (our turn). When either call ends the game, TD-Leaf(lambda) runs once
//! over the recorded variations and the new weights are optionally saved.

use log::{debug, info};

use crate::board::{Board, Player};
use crate::config::AgentConfig;
use crate::error::{Result, SliderError};
use crate::eval::Evaluator;
use crate::moves::{Move, str_move};
use crate::search::{LogObserver, PrincipalVariation, Searcher};
use crate::weights::Weights;

pub struct Agent {
    config: AgentConfig,
    player: Player,
    board: Board,
    evaluator: Evaluator,
    weights: Weights,
    variations: Vec<PrincipalVariation>,
    finished: bool,
}

impl Agent {
    /// Create an agent for `player` on `board` with explicit weights.
    pub fn new(config: AgentConfig, board: Board, player: Player, weights: Weights) -> Result<Self> {
        let evaluator = Evaluator::new(player, config.feature_set, config.shrink);
        evaluator.check_weights(board.size(), &weights)?;
        Ok(Self {
            config,
            player,
            board,
            evaluator,
            weights,
            variations: Vec::new(),
            finished: false,
        })
    }

    /// Set up from the referee's description of the game: board size, board
    /// text and our piece type (`'H'` or `'V'`).
    ///
    /// Weights come from the configured weights file, or from the feature
    /// set's defaults when no file is configured. A configured file that
    /// cannot be read is an error.
    pub fn init(size: usize, board_text: &str, player: char, config: AgentConfig) -> Result<Self> {
        let player = Player::from_char(player)?;
        let board = Board::parse(size, board_text)?;
        let weights = match &config.weights_path {
            Some(path) => Weights::load(path)?,
            None => config.feature_set.default_weights(size),
        };
        info!(
            "agent {player} on {size}x{size}, {} features, weights {weights}",
            config.feature_set
        );
        Self::new(config, board, player, weights)
    }

    /// Apply the opponent's move, or a pass for `None`.
    ///
    /// The move must be one of the opponent's legal moves; otherwise the
    /// board is left untouched and an error is returned.
    pub fn update(&mut self, mv: Option<Move>) -> Result<()> {
        if let Some(m) = mv {
            let opp = self.player.opponent();
            if !self.board.legal_moves(opp).contains(&m) {
                return Err(SliderError::IllegalMove { mv: m, player: opp });
            }
            self.board.play(m)?;
        }
        self.check_game_end()
    }

    /// Choose our move, play it on the live board and return it. `None`
    /// means we pass.
    pub fn make_move(&mut self) -> Result<Option<Move>> {
        if self.finished || self.board.legal_moves(self.player).is_empty() {
            return Ok(None);
        }

        let mut observer = LogObserver;
        let mut searcher = Searcher::new(&self.evaluator, &self.weights);
        if self.config.trace {
            searcher = searcher.with_observer(&mut observer);
        }
        let result = searcher.search(&self.board, &self.config.limits)?;
        debug!(
            "{} plays {} (value {:.4}, depth {}, {} nodes)",
            self.player,
            str_move(result.best_move),
            result.value,
            result.depth,
            result.nodes
        );

        if let Some(mv) = result.best_move {
            self.board.play(mv)?;
        }
        if let Some(pv) = result.variation {
            self.variations.push(pv);
        }
        self.check_game_end()?;
        Ok(result.best_move)
    }

    fn check_game_end(&mut self) -> Result<()> {
        if self.finished || !self.board.is_game_over() {
            return Ok(());
        }
        self.finished = true;
        info!(
            "game over for {}: H has {} pieces, V has {}",
            self.player,
            self.board.piece_count(Player::H),
            self.board.piece_count(Player::V)
        );
        if self.config.learn {
            self.learn()?;
        }
        Ok(())
    }

    /// Run TD-Leaf(lambda) over the recorded variations, replace the weights
    /// and save them when configured to. The variations are consumed.
    pub fn learn(&mut self) -> Result<()> {
        let variations = std::mem::take(&mut self.variations);
        let updated = self
            .config
            .learning
            .update(&self.evaluator, &self.weights, &variations)?;
        self.weights = updated;

        match &self.config.weights_path {
            Some(path) if self.config.commit_weights => {
                self.weights.save(path)?;
                info!("saved weights to {}", path.display());
            }
            Some(path) => info!("not saving weights to {}", path.display()),
            None => {}
        }
        Ok(())
    }

    #[inline]
    pub fn player(&self) -> Player {
        self.player
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    #[inline]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Variations recorded so far in this game.
    pub fn principal_variations(&self) -> &[PrincipalVariation] {
        &self.variations
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Direction;

    const SAMPLE: &str = "+ + H +\nH + + +\nH + V +\n+ + V V\n";

    fn agent(player: char) -> Agent {
        Agent::init(4, SAMPLE, player, AgentConfig::default().with_depth(2)).unwrap()
    }

    #[test]
    fn test_init_rejects_unknown_player() {
        let err = Agent::init(4, SAMPLE, 'X', AgentConfig::default()).err().unwrap();
        assert!(matches!(err, SliderError::UnknownPlayer('X')));
    }

    #[test]
    fn test_move_records_variation_and_plays() {
        let mut a = agent('H');
        let before = a.board().clone();
        let mv = a.make_move().unwrap().unwrap();
        assert!(before.legal_moves(Player::H).contains(&mv));
        assert_ne!(a.board(), &before);
        assert_eq!(a.principal_variations().len(), 1);
    }

    #[test]
    fn test_variations_follow_played_moves() {
        let mut a = agent('H');
        for turn in 1..=2 {
            let before = a.board().clone();
            let mv = a.make_move().unwrap().unwrap();
            let expected = crate::moves::apply_move(&before, Some(mv)).unwrap();
            assert_eq!(a.board(), &expected);
            assert_eq!(a.principal_variations().len(), turn);
            a.update(None).unwrap();
        }

        // H is boxed in: a pass records nothing.
        let mut stuck = Agent::init(3, "B B +\nH B +\nB + V\n", 'H', AgentConfig::default()).unwrap();
        assert_eq!(stuck.make_move().unwrap(), None);
        assert!(stuck.principal_variations().is_empty());
    }

    #[test]
    fn test_update_rejects_illegal_move() {
        let mut a = agent('H');
        let before = a.board().clone();
        // V never moves down.
        let err = a.update(Some(Move::new(2, 1, Direction::Down))).unwrap_err();
        assert!(matches!(err, SliderError::IllegalMove { player: Player::V, .. }));
        assert_eq!(a.board(), &before);
    }

    #[test]
    fn test_update_pass_keeps_board() {
        let mut a = agent('V');
        let before = a.board().clone();
        a.update(None).unwrap();
        assert_eq!(a.board(), &before);
        assert!(!a.is_finished());
    }

    #[test]
    fn test_init_fails_on_missing_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo_weights.txt");
        let config = AgentConfig::default().with_weights_path(&path);
        let err = Agent::init(4, SAMPLE, 'H', config).err().unwrap();
        assert!(matches!(err, SliderError::WeightsIo { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_weight_count_mismatch_is_rejected() {
        let board: Board = SAMPLE.parse().unwrap();
        let weights = Weights::new(vec![1.0, 2.0]).unwrap();
        let err = Agent::new(AgentConfig::default(), board, Player::H, weights).err().unwrap();
        assert!(matches!(err, SliderError::WeightCount { expected: 3, found: 2 }));
    }
}
