//! TD-Leaf(lambda) weight adaptation.
//!
//! After a game, the leaves of the principal variations chosen on each turn
//! form a sequence of evaluations `v_0 .. v_n`. With temporal differences
//! `d_t = v_{t+1} - v_t`, each weight moves by
//!
//! ```text
//! w_i += alpha * sum_t  dv_t/dw_i * sum_{j >= t} lambda^(j - t) * d_j
//! ```
//!
//! where the derivative is a forward finite difference of the squashed
//! weighted sum at the recorded leaf.

use log::{debug, info, warn};

use crate::constants::{ALPHA, DERIVATIVE_STEP, LAMBDA};
use crate::error::Result;
use crate::eval::Evaluator;
use crate::search::PrincipalVariation;
use crate::weights::Weights;

/// Learning constants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TdLeaf {
    /// Learning rate.
    pub alpha: f64,
    /// Decay applied to temporal differences further in the future.
    pub lambda: f64,
    /// Finite-difference step for the partial derivatives.
    pub step: f64,
}

impl Default for TdLeaf {
    fn default() -> Self {
        Self {
            alpha: ALPHA,
            lambda: LAMBDA,
            step: DERIVATIVE_STEP,
        }
    }
}

/// `v_{t+1} - v_t` for each adjacent pair of variations.
pub fn temporal_differences(variations: &[PrincipalVariation]) -> Vec<f64> {
    variations
        .windows(2)
        .map(|w| w[1].value - w[0].value)
        .collect()
}

/// `sum_{j >= t} lambda^(j - t) * d_j` for every `t`.
pub fn discounted_sums(diffs: &[f64], lambda: f64) -> Vec<f64> {
    let mut sums = vec![0.0; diffs.len()];
    let mut acc = 0.0;
    for t in (0..diffs.len()).rev() {
        acc = diffs[t] + lambda * acc;
        sums[t] = acc;
    }
    sums
}

impl TdLeaf {
    pub fn new(alpha: f64, lambda: f64) -> Self {
        Self {
            alpha,
            lambda,
            ..Self::default()
        }
    }

    /// Summed update direction for every weight, before scaling by alpha.
    pub fn gradient(
        &self,
        evaluator: &Evaluator,
        weights: &Weights,
        variations: &[PrincipalVariation],
    ) -> Vec<f64> {
        let sums = discounted_sums(&temporal_differences(variations), self.lambda);
        (0..weights.len())
            .map(|i| {
                sums.iter()
                    .zip(variations)
                    .map(|(s, pv)| {
                        let d = evaluator.partial_derivative(
                            &pv.board,
                            &pv.features,
                            weights,
                            i,
                            self.step,
                        );
                        d * s
                    })
                    .sum()
            })
            .collect()
    }

    /// Weights after one TD-Leaf(lambda) update over a finished game.
    ///
    /// Fewer than two variations carry no temporal difference and leave the
    /// weights unchanged. A weight whose update is not finite keeps its old
    /// value.
    pub fn update(
        &self,
        evaluator: &Evaluator,
        weights: &Weights,
        variations: &[PrincipalVariation],
    ) -> Result<Weights> {
        if variations.len() < 2 {
            debug!("only {} variation(s) recorded; weights unchanged", variations.len());
            return Ok(weights.clone());
        }

        let gradient = self.gradient(evaluator, weights, variations);
        let updated = weights
            .as_slice()
            .iter()
            .zip(&gradient)
            .enumerate()
            .map(|(i, (&w, &g))| {
                let next = w + self.alpha * g;
                if next.is_finite() {
                    next
                } else {
                    warn!("update of weight {i} is not finite; keeping {w}");
                    w
                }
            })
            .collect();
        let updated = Weights::new(updated)?;
        info!(
            "td-leaf over {} positions: {} -> {}",
            variations.len(),
            weights,
            updated
        );
        Ok(updated)
    }
}
