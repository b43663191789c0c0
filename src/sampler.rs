use crate::model::{N_OPTIONS, check_distribution};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_distr::weighted::WeightedIndex;

/// Choices drawn for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    /// Number of agents that chose each option.
    pub counts: Vec<usize>,
    /// Option chosen by each agent, in agent order.
    pub choices: Vec<usize>,
}

/// Draw the choice of each of `n_agents` agents independently from `probs`.
///
/// The distribution is checked, never renormalized.
///
/// # Errors
/// Returns [`crate::error::SimError::InvalidDistribution`] if `probs` is not a
/// valid probability vector.
pub fn sample_round<R: Rng + ?Sized>(probs: &[f64], n_agents: usize, rng: &mut R) -> Result<Tally> {
    check_distribution(probs).context("failed to validate sampling distribution")?;
    let choice_dist = WeightedIndex::new(probs).context("failed to build choice distribution")?;

    let mut counts = vec![0; N_OPTIONS];
    let mut choices = Vec::with_capacity(n_agents);
    for _ in 0..n_agents {
        let choice = choice_dist.sample(rng);
        counts[choice] += 1;
        choices.push(choice);
    }

    Ok(Tally { counts, choices })
}
