//! Option rewards as a function of the round's choice counts.
//!
//! Every agent that picks a given option receives the same reward, so a round
//! is scored by building a per-option table and looking each agent up in it.

use crate::config::RewardConfig;
use crate::model::{Choice, N_OPTIONS};

/// Reward paid to each agent choosing each option, given the round's `counts`.
///
/// A tie at the maximum (minimum) count still activates solidarity (wisdom).
/// A round where everyone picks one option is ordinary.
pub fn reward_table(rewards: &RewardConfig, counts: &[usize]) -> Vec<f64> {
    debug_assert_eq!(counts.len(), N_OPTIONS);

    let max_count = counts.iter().copied().max().unwrap_or(0);
    let min_count = counts.iter().copied().min().unwrap_or(0);

    Choice::ALL
        .iter()
        .map(|&choice| {
            let count = counts[choice.idx()];
            match choice {
                Choice::Cautious => rewards.cautious,
                Choice::Fairness if count > 0 => rewards.fairness / count as f64,
                Choice::Fairness => 0.0,
                Choice::Solidarity if count == max_count => rewards.solidarity,
                Choice::Wisdom if count == min_count => rewards.wisdom,
                Choice::Bravery if count == 1 => rewards.bravery,
                Choice::Solidarity | Choice::Wisdom | Choice::Bravery => 0.0,
            }
        })
        .collect()
}

/// Score of each agent according to its choice.
pub fn score_agents(table: &[f64], choices: &[usize]) -> Vec<f64> {
    choices.iter().map(|&choice| table[choice]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rewards() -> RewardConfig {
        RewardConfig {
            cautious: 1.0,
            fairness: 3.0,
            solidarity: 2.0,
            wisdom: 2.0,
            bravery: 4.0,
        }
    }

    /// Strategy: generate counts of a round with 1 to 20 agents.
    fn counts_strategy() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0..=20usize, N_OPTIONS)
            .prop_filter("round needs an agent", |c| c.iter().sum::<usize>() > 0)
    }

    proptest! {
        #[test]
        fn fairness_shares_pool(counts in counts_strategy()) {
            let table = reward_table(&rewards(), &counts);
            let count = counts[Choice::Fairness.idx()];
            let reward = table[Choice::Fairness.idx()];
            if count == 0 {
                prop_assert_eq!(reward, 0.0);
            } else {
                prop_assert!((reward * count as f64 - 3.0).abs() < 1e-12);
            }
        }

        #[test]
        fn bravery_iff_single_agent(counts in counts_strategy()) {
            let table = reward_table(&rewards(), &counts);
            let active = table[Choice::Bravery.idx()] != 0.0;
            prop_assert_eq!(active, counts[Choice::Bravery.idx()] == 1);
        }

        #[test]
        fn solidarity_iff_max_and_wisdom_iff_min(counts in counts_strategy()) {
            let table = reward_table(&rewards(), &counts);
            let max_count = *counts.iter().max().unwrap();
            let min_count = *counts.iter().min().unwrap();

            let solidarity = table[Choice::Solidarity.idx()] != 0.0;
            prop_assert_eq!(solidarity, counts[Choice::Solidarity.idx()] == max_count);

            let wisdom = table[Choice::Wisdom.idx()] != 0.0;
            prop_assert_eq!(wisdom, counts[Choice::Wisdom.idx()] == min_count);

            prop_assert_eq!(table[Choice::Cautious.idx()], 1.0);
        }
    }

    #[test]
    fn ten_agent_round() {
        let counts = [2, 3, 1, 3, 1];
        let table = reward_table(&rewards(), &counts);

        // Solidarity (1) is below the max of 3; wisdom (3) sits at the max.
        assert_eq!(table, vec![1.0, 1.0, 0.0, 0.0, 4.0]);

        let choices = [0, 0, 1, 1, 1, 2, 3, 3, 3, 4];
        let scores = score_agents(&table, &choices);
        assert_eq!(
            scores,
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 4.0]
        );
    }

    #[test]
    fn tied_extremes_activate_bonuses() {
        // Solidarity ties the max and wisdom ties the min.
        let table = reward_table(&rewards(), &[1, 3, 3, 1, 2]);
        assert_eq!(table[Choice::Solidarity.idx()], 2.0);
        assert_eq!(table[Choice::Wisdom.idx()], 2.0);
        assert_eq!(table[Choice::Bravery.idx()], 0.0);
    }

    #[test]
    fn everyone_on_one_option() {
        let table = reward_table(&rewards(), &[0, 0, 10, 0, 0]);
        assert_eq!(table[Choice::Solidarity.idx()], 2.0);
        assert_eq!(table[Choice::Wisdom.idx()], 2.0);
        assert_eq!(table[Choice::Fairness.idx()], 0.0);
        assert_eq!(table[Choice::Bravery.idx()], 0.0);
    }
}
