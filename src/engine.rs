use crate::adapter::Adapter;
use crate::config::Config;
use crate::model::{Choice, RoundOutcome, Snapshot, Trajectory};
use crate::payoff::{reward_table, score_agents};
use crate::sampler::sample_round;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Results of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Probability vector after the last adaptation.
    pub probs: Vec<f64>,
    /// Outcome of the last round.
    pub outcome: RoundOutcome,
    /// Snapshots sampled during the run.
    pub trajectory: Trajectory,
    /// Mean of the sampled mean scores.
    pub mean_score: f64,
}

/// Simulation engine.
///
/// Holds the configuration, the current probability vector and the random
/// number generator, and plays the configured number of rounds.
pub struct Engine {
    cfg: Config,
    adapter: Adapter,
    probs: Vec<f64>,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` starting from the configured initial probabilities.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(cfg: Config, rng: ChaCha12Rng) -> Result<Self> {
        cfg.validate().context("failed to validate config")?;

        let adapter = Adapter::new(&cfg);
        let probs = cfg.strategy.init_probs.clone();

        Ok(Self {
            cfg,
            adapter,
            probs,
            rng,
        })
    }

    /// Create a new `Engine` seeded with `seed`, or from OS entropy if `None`.
    pub fn from_seed(cfg: Config, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng")?,
        };
        Self::new(cfg, rng)
    }

    /// Play every round and return the results.
    ///
    /// # Errors
    /// Fails on the first round whose probability vector becomes invalid.
    pub fn run(mut self) -> Result<Summary> {
        let n_rounds = self.cfg.game.n_rounds;
        let rounds_per_sample = sample_interval(n_rounds);
        let rounds_per_log = (n_rounds / 10).max(1);

        let mut trajectory = Trajectory::new();
        let mut last_outcome = None;

        for i_round in 0..n_rounds {
            let outcome = self
                .play_round()
                .with_context(|| format!("failed to play round {i_round}"))?;

            if outcome.is_degenerate() {
                let choice = Choice::ALL[outcome.choices[0]];
                log::debug!("round {i_round}: every agent chose {}", choice.name());
            }

            if i_round % rounds_per_sample == 0 {
                let mean_score = outcome.mean_score();
                let probs = &self.probs;
                log::debug!("round {i_round}: probs {probs:?}, mean score {mean_score}");
                trajectory.push(Snapshot {
                    round: i_round,
                    probs: self.probs.clone(),
                    mean_score,
                });
            }

            self.probs = self
                .adapter
                .adapt(&self.probs, &outcome, i_round)
                .with_context(|| format!("failed to adapt after round {i_round}"))?;

            if (i_round + 1) % rounds_per_log == 0 {
                let progress = 100.0 * (i_round + 1) as f64 / n_rounds as f64;
                log::info!("completed {progress:06.2}%");
            }

            last_outcome = Some(outcome);
        }

        let outcome = last_outcome.context("no rounds were played")?;
        let mean_score = trajectory.mean_score();

        Ok(Summary {
            probs: self.probs,
            outcome,
            trajectory,
            mean_score,
        })
    }

    fn play_round(&mut self) -> Result<RoundOutcome> {
        let tally = sample_round(&self.probs, self.cfg.game.n_agents, &mut self.rng)
            .context("failed to sample choices")?;

        let table = reward_table(&self.cfg.rewards, &tally.counts);
        let scores = score_agents(&table, &tally.choices);

        Ok(RoundOutcome {
            counts: tally.counts,
            choices: tally.choices,
            scores,
        })
    }
}

/// Number of rounds between trajectory snapshots.
///
/// Round `i` is sampled iff `i % sample_interval(n_rounds) == 0`, which yields
/// every round for short runs and about a hundred snapshots otherwise.
pub fn sample_interval(n_rounds: usize) -> usize {
    (n_rounds / 100).max(1)
}
