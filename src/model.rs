//! Simulation data types.

use crate::error::SimError;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Number of options of the game.
pub const N_OPTIONS: usize = 5;

/// Tolerance on the sum of a probability vector.
pub const PROB_TOL: f64 = 1e-5;

/// Option an agent can choose in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Flat reward.
    Cautious,
    /// Pool reward shared by everyone who chose it.
    Fairness,
    /// Bonus if it is among the most chosen options.
    Solidarity,
    /// Bonus if it is among the least chosen options.
    Wisdom,
    /// Bonus if exactly one agent chose it.
    Bravery,
}

impl Choice {
    pub const ALL: [Choice; N_OPTIONS] = [
        Choice::Cautious,
        Choice::Fairness,
        Choice::Solidarity,
        Choice::Wisdom,
        Choice::Bravery,
    ];

    /// Index of the option in probability and count vectors.
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Choice::Cautious => "cautious",
            Choice::Fairness => "fairness",
            Choice::Solidarity => "solidarity",
            Choice::Wisdom => "wisdom",
            Choice::Bravery => "bravery",
        }
    }
}

/// Check that `probs` is a valid probability vector over the options.
///
/// # Errors
/// Returns [`SimError::InvalidDistribution`] if the vector has the wrong length,
/// a negative or non-finite element, or does not sum to 1.0 within [`PROB_TOL`].
pub fn check_distribution(probs: &[f64]) -> Result<()> {
    let invalid = |reason: String| SimError::InvalidDistribution { reason };

    let len = probs.len();
    if len != N_OPTIONS {
        bail!(invalid(format!("length must be {N_OPTIONS}, but is {len}")));
    }
    if let Some(ele) = probs.iter().find(|ele| !ele.is_finite() || **ele < 0.0) {
        let reason = format!("elements must be finite and non-negative, but found {ele}");
        bail!(invalid(reason));
    }
    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROB_TOL {
        let reason = format!("must sum to 1.0 (tolerance: {PROB_TOL}), but sums to {sum}");
        bail!(invalid(reason));
    }
    Ok(())
}

/// Outcome of a single round.
///
/// Agents are identified by their position in `choices` and `scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Number of agents that chose each option.
    pub counts: Vec<usize>,
    /// Option chosen by each agent.
    pub choices: Vec<usize>,
    /// Score awarded to each agent.
    pub scores: Vec<f64>,
}

impl RoundOutcome {
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn min_count(&self) -> usize {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    pub fn count(&self, choice: Choice) -> usize {
        self.counts[choice.idx()]
    }

    pub fn mean_score(&self) -> f64 {
        if self.scores.is_empty() {
            return f64::NAN;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Options whose agents obtained the highest individual score this round.
    ///
    /// Only options that were actually chosen are candidates.
    pub fn best_options(&self) -> Vec<usize> {
        let scores = self.scores.iter().copied();
        let max_score = scores.fold(f64::NEG_INFINITY, f64::max);

        let mut is_best = vec![false; self.counts.len()];
        for (&choice, &score) in self.choices.iter().zip(&self.scores) {
            if score == max_score {
                is_best[choice] = true;
            }
        }

        (0..is_best.len()).filter(|&i| is_best[i]).collect()
    }

    /// Whether every agent chose the same option.
    ///
    /// Such rounds are legal; they are only worth a diagnostic.
    pub fn is_degenerate(&self) -> bool {
        !self.choices.is_empty() && self.max_count() == self.choices.len()
    }
}

/// Checkpoint of the run taken at a sampled round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Round index (0-based).
    pub round: usize,
    /// Probability vector used to sample this round.
    pub probs: Vec<f64>,
    /// Mean of this round's per-agent scores.
    pub mean_score: f64,
}

/// Sequence of snapshots accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    snapshots: Vec<Snapshot>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Mean of the mean-score snapshots (NaN if there are none).
    pub fn mean_score(&self) -> f64 {
        if self.snapshots.is_empty() {
            return f64::NAN;
        }
        let sum: f64 = self.snapshots.iter().map(|snap| snap.mean_score).sum();
        sum / self.snapshots.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(counts: Vec<usize>, choices: Vec<usize>, scores: Vec<f64>) -> RoundOutcome {
        RoundOutcome {
            counts,
            choices,
            scores,
        }
    }

    #[test]
    fn check_distribution_rejects_bad_vectors() {
        check_distribution(&[0.2; N_OPTIONS]).expect("uniform vector is valid");

        for probs in [
            vec![0.25; 4],
            vec![0.5, 0.5, 0.0, 0.0, 0.1],
            vec![1.2, -0.2, 0.0, 0.0, 0.0],
            vec![f64::NAN, 0.25, 0.25, 0.25, 0.25],
        ] {
            let err = check_distribution(&probs).expect_err("vector should be rejected");
            assert!(matches!(
                err.downcast_ref::<SimError>(),
                Some(SimError::InvalidDistribution { .. })
            ));
        }
    }

    #[test]
    fn best_options_collects_ties() {
        let out = outcome(vec![1, 1, 1, 0, 0], vec![0, 1, 2], vec![2.0, 2.0, 0.0]);
        assert_eq!(out.best_options(), vec![0, 1]);
    }

    #[test]
    fn degenerate_round_detected() {
        let out = outcome(vec![0, 0, 3, 0, 0], vec![2, 2, 2], vec![2.0; 3]);
        assert!(out.is_degenerate());
        assert_eq!(out.min_count(), 0);
        assert_eq!(out.max_count(), 3);
    }

    #[test]
    fn trajectory_mean_score() {
        let mut traj = Trajectory::new();
        assert!(traj.mean_score().is_nan());
        for (round, mean_score) in [(0, 1.0), (1, 2.0)] {
            traj.push(Snapshot {
                round,
                probs: vec![0.2; N_OPTIONS],
                mean_score,
            });
        }
        assert_eq!(traj.snapshots().len(), 2);
        assert!((traj.mean_score() - 1.5).abs() < 1e-12);
    }
}
