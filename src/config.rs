use crate::error::SimError;
use crate::model::{N_OPTIONS, check_distribution};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug, fs,
    ops::{Bound, RangeBounds},
    path::Path,
};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub game: GameConfig,
    pub rewards: RewardConfig,
    pub strategy: StrategyConfig,
}

/// Shape of the game.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    /// Number of agents.
    pub n_agents: usize,
    /// Number of options.
    pub n_options: usize,
    /// Number of rounds played in a run.
    pub n_rounds: usize,

    /// Enable the periodic call for solidarity.
    pub communicate: bool,

    /// Seed of the random number generator (OS entropy if absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Base reward of each option.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewardConfig {
    pub cautious: f64,
    /// Pool shared evenly by the agents choosing fairness.
    pub fairness: f64,
    pub solidarity: f64,
    pub wisdom: f64,
    pub bravery: f64,
}

/// Initial strategy and adaptation constants.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Initial option probabilities.
    pub init_probs: Vec<f64>,

    /// Multiplier applied to reinforced options.
    pub learn_rate_up: f64,
    /// Divisor applied to discouraged options.
    pub learn_rate_down: f64,

    pub wisdom_weight: f64,
    /// Gain of the proportional feedback on solidarity.
    pub solidarity_weight: f64,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Check every parameter.
    ///
    /// # Errors
    /// Returns an error carrying [`SimError::InvalidConfig`] for the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field| SimError::InvalidConfig { field };

        let game = &self.game;
        check_num(game.n_agents, 1..=10_000).context(invalid("game.n_agents"))?;
        check_num(game.n_options, N_OPTIONS..=N_OPTIONS).context(invalid("game.n_options"))?;
        check_num(game.n_rounds, 1..=1_000_000).context(invalid("game.n_rounds"))?;

        let rewards = &self.rewards;
        check_num(rewards.cautious, 0.0..1e6).context(invalid("rewards.cautious"))?;
        check_num(rewards.fairness, 0.0..1e6).context(invalid("rewards.fairness"))?;

        // bonuses must be strictly positive
        let bonus_range = (Bound::Excluded(0.0), Bound::Excluded(1e6));
        for (field, reward) in [
            ("rewards.solidarity", rewards.solidarity),
            ("rewards.wisdom", rewards.wisdom),
            ("rewards.bravery", rewards.bravery),
        ] {
            check_num(reward, bonus_range).context(invalid(field))?;
        }

        let strategy = &self.strategy;
        check_vec(&strategy.init_probs, game.n_options).context(invalid("strategy.init_probs"))?;

        let rate_range = (Bound::Excluded(1.0), Bound::Excluded(100.0));
        check_num(strategy.learn_rate_up, rate_range).context(invalid("strategy.learn_rate_up"))?;
        check_num(strategy.learn_rate_down, rate_range)
            .context(invalid("strategy.learn_rate_down"))?;

        let weight_range = (Bound::Excluded(0.0), Bound::Excluded(100.0));
        check_num(strategy.wisdom_weight, weight_range).context(invalid("strategy.wisdom_weight"))?;
        check_num(strategy.solidarity_weight, weight_range)
            .context(invalid("strategy.solidarity_weight"))?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_vec(vec: &[f64], exp_len: usize) -> Result<()> {
    let len = vec.len();
    if len != exp_len {
        bail!("vector length must be {exp_len}, but is {len}");
    }
    check_distribution(vec)
}
