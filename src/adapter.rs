//! Multiplicative adaptation of the population strategy.
//!
//! After every round the probability vector is rescaled option by option and
//! renormalized once at the end. The rescaling steps, applied in order to the
//! same working vector, are:
//!
//! 1. The options whose agents got the highest individual score are multiplied
//!    by `up^(1/n)`, where `n` is the number of tied options.
//! 2. Bravery is multiplied by `up` if nobody chose it, so that it can always
//!    be rediscovered.
//! 3. Wisdom is multiplied by `up` if its count is the minimum count, and
//!    divided by `down` otherwise.
//! 4. Solidarity is multiplied by `up` if its count is the maximum count.
//! 5. With communication enabled, every [`CALL_INTERVAL`] rounds someone calls
//!    for solidarity: if nobody chose it, it is multiplied by `up`, otherwise it
//!    is multiplied by `max_count / count * solidarity_weight`.

use crate::config::Config;
use crate::error::SimError;
use crate::model::{Choice, RoundOutcome, check_distribution};
use anyhow::{Context, Result, bail};

/// Number of rounds between calls for solidarity.
pub const CALL_INTERVAL: usize = 20;

/// Adaptation rule with its constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Adapter {
    learn_rate_up: f64,
    learn_rate_down: f64,
    solidarity_weight: f64,
    communicate: bool,
}

impl Adapter {
    pub fn new(cfg: &Config) -> Self {
        Self {
            learn_rate_up: cfg.strategy.learn_rate_up,
            learn_rate_down: cfg.strategy.learn_rate_down,
            solidarity_weight: cfg.strategy.solidarity_weight,
            communicate: cfg.game.communicate,
        }
    }

    /// Compute the probability vector of the next round.
    ///
    /// `round` is the 0-based index of the round that produced `outcome`.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidDistribution`] if the rescaled vector cannot be
    /// renormalized.
    pub fn adapt(&self, probs: &[f64], outcome: &RoundOutcome, round: usize) -> Result<Vec<f64>> {
        let up = self.learn_rate_up;
        let down = self.learn_rate_down;

        let mut next = probs.to_vec();

        let best = outcome.best_options();
        if !best.is_empty() {
            let boost = up.powf(1.0 / best.len() as f64);
            for i_opt in best {
                next[i_opt] *= boost;
            }
        }

        let bravery = Choice::Bravery.idx();
        if outcome.count(Choice::Bravery) == 0 {
            next[bravery] *= up;
        }

        let wisdom = Choice::Wisdom.idx();
        if outcome.count(Choice::Wisdom) == outcome.min_count() {
            next[wisdom] *= up;
        } else {
            next[wisdom] /= down;
        }

        let solidarity = Choice::Solidarity.idx();
        let n_solidarity = outcome.count(Choice::Solidarity);
        if n_solidarity == outcome.max_count() {
            next[solidarity] *= up;
        }

        if self.communicate && round % CALL_INTERVAL == 0 {
            if n_solidarity == 0 {
                next[solidarity] *= up;
            } else {
                let ratio = outcome.max_count() as f64 / n_solidarity as f64;
                next[solidarity] *= ratio * self.solidarity_weight;
            }
        }

        normalize(&mut next).context("failed to normalize probabilities")?;

        Ok(next)
    }
}

/// Divide every element by the sum of the vector.
fn normalize(probs: &mut [f64]) -> Result<()> {
    let invalid = |reason: String| SimError::InvalidDistribution { reason };

    if let Some(ele) = probs.iter().find(|ele| !ele.is_finite() || **ele < 0.0) {
        let reason = format!("elements must be finite and non-negative, but found {ele}");
        bail!(invalid(reason));
    }
    let sum: f64 = probs.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        let reason = format!("sum must be finite and positive, but is {sum}");
        bail!(invalid(reason));
    }

    probs.iter_mut().for_each(|ele| *ele /= sum);

    check_distribution(probs)
}
