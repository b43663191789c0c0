//! Convergence of the population strategy.
//!
//! Snapshots are points of the probability simplex, so the distance between
//! two of them is the total variation distance, half the L1 norm of their
//! difference. The last quarter of the trajectory is the settling window.

use crate::model::{Choice, N_OPTIONS, Trajectory};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Largest step inside the window for the strategy to count as settled.
pub const SETTLE_TOL: f64 = 0.05;

/// Window statistics of one option's probability.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionReport {
    pub option: String,
    pub final_prob: f64,
    pub window_mean: f64,
    pub window_std_dev: f64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub n_snapshots: usize,
    pub n_window: usize,
    pub options: Vec<OptionReport>,
    /// Mean distance between successive snapshots in the window.
    pub mean_step: f64,
    /// Largest distance between successive snapshots in the window.
    pub max_step: f64,
    /// Distance between the first and last snapshot of the window.
    pub drift: f64,
    /// Mean of the sampled mean scores in the window.
    pub mean_score: f64,
    pub settled: bool,
}

/// Total variation distance between two probability vectors.
pub fn tv_distance(probs_a: &[f64], probs_b: &[f64]) -> f64 {
    let l1: f64 = probs_a
        .iter()
        .zip(probs_b)
        .map(|(a, b)| (a - b).abs())
        .sum();
    0.5 * l1
}

/// Measure how far the strategy still moves at the end of `trajectory`.
///
/// # Errors
/// Returns an error if the trajectory is empty or a snapshot has the wrong length.
pub fn analyze_trajectory(trajectory: &Trajectory) -> Result<Report> {
    let snapshots = trajectory.snapshots();
    if snapshots.is_empty() {
        bail!("trajectory has no snapshots");
    }
    if let Some(snap) = snapshots.iter().find(|snap| snap.probs.len() != N_OPTIONS) {
        let len = snap.probs.len();
        bail!("snapshot of round {} has {len} probabilities", snap.round);
    }

    let n_snapshots = snapshots.len();
    let n_window = (n_snapshots / 4).max(2).min(n_snapshots);
    let window = &snapshots[n_snapshots - n_window..];

    let steps: Vec<f64> = window
        .windows(2)
        .map(|pair| tv_distance(&pair[0].probs, &pair[1].probs))
        .collect();
    let max_step = steps.iter().copied().fold(0.0, f64::max);

    let first = &window[0];
    let last = &window[n_window - 1];

    let options = Choice::ALL
        .iter()
        .map(|&choice| {
            let i_opt = choice.idx();
            let probs: Vec<f64> = window.iter().map(|snap| snap.probs[i_opt]).collect();
            let (window_mean, window_std_dev) = mean_std_dev(&probs);
            OptionReport {
                option: choice.name().to_string(),
                final_prob: last.probs[i_opt],
                window_mean,
                window_std_dev,
            }
        })
        .collect();

    let scores: Vec<f64> = window.iter().map(|snap| snap.mean_score).collect();

    Ok(Report {
        n_snapshots,
        n_window,
        options,
        mean_step: mean_std_dev(&steps).0,
        max_step,
        drift: tv_distance(&first.probs, &last.probs),
        mean_score: mean_std_dev(&scores).0,
        settled: !steps.is_empty() && max_step < SETTLE_TOL,
    })
}

/// Mean and sample standard deviation (NaN where undefined).
fn mean_std_dev(vals: &[f64]) -> (f64, f64) {
    let n_vals = vals.len();
    if n_vals == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = vals.iter().sum::<f64>() / n_vals as f64;
    if n_vals < 2 {
        return (mean, f64::NAN);
    }
    let sum_sq: f64 = vals.iter().map(|val| (val - mean).powi(2)).sum();
    (mean, (sum_sq / (n_vals - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snapshot;

    fn trajectory(probs_vec: Vec<Vec<f64>>) -> Trajectory {
        let mut traj = Trajectory::new();
        for (round, probs) in probs_vec.into_iter().enumerate() {
            traj.push(Snapshot {
                round,
                probs,
                mean_score: 1.5,
            });
        }
        traj
    }

    #[test]
    fn total_variation() {
        let probs_a = [0.5, 0.5, 0.0, 0.0, 0.0];
        let probs_b = [0.2; N_OPTIONS];
        assert!((tv_distance(&probs_a, &probs_b) - 0.6).abs() < 1e-12);
        assert_eq!(tv_distance(&probs_a, &probs_a), 0.0);
    }

    #[test]
    fn constant_trajectory_settled() {
        let probs = vec![0.1, 0.2, 0.3, 0.15, 0.25];
        let report = analyze_trajectory(&trajectory(vec![probs.clone(); 64])).unwrap();

        assert_eq!(report.n_snapshots, 64);
        assert_eq!(report.n_window, 16);
        assert_eq!(report.mean_step, 0.0);
        assert_eq!(report.drift, 0.0);
        assert!(report.settled);
        assert_eq!(report.options[2].option, "solidarity");
        for (option, &prob) in report.options.iter().zip(&probs) {
            assert_eq!(option.final_prob, prob);
            assert!((option.window_mean - prob).abs() < 1e-12);
            assert!(option.window_std_dev.abs() < 1e-12);
        }
        assert!((report.mean_score - 1.5).abs() < 1e-12);
    }

    #[test]
    fn transient_outside_window() {
        let mut probs_vec = vec![vec![1.0, 0.0, 0.0, 0.0, 0.0]; 6];
        probs_vec.extend(vec![vec![0.2; N_OPTIONS]; 2]);
        let report = analyze_trajectory(&trajectory(probs_vec)).unwrap();

        assert_eq!(report.n_window, 2);
        assert_eq!(report.max_step, 0.0);
        assert!(report.settled);
    }

    #[test]
    fn oscillation_not_settled() {
        let probs_vec = (0..40)
            .map(|i| {
                let mut probs = vec![0.0; N_OPTIONS];
                probs[i % 2] = 1.0;
                probs
            })
            .collect();
        let report = analyze_trajectory(&trajectory(probs_vec)).unwrap();

        assert_eq!(report.n_window, 10);
        assert_eq!(report.max_step, 1.0);
        assert_eq!(report.mean_step, 1.0);
        assert_eq!(report.drift, 1.0);
        assert!(!report.settled);
    }

    #[test]
    fn single_snapshot() {
        let report = analyze_trajectory(&trajectory(vec![vec![0.2; N_OPTIONS]])).unwrap();
        assert_eq!(report.n_window, 1);
        assert!(report.mean_step.is_nan());
        assert!(report.options[0].window_std_dev.is_nan());
        assert!(!report.settled);
    }

    #[test]
    fn malformed_trajectory_rejected() {
        assert!(analyze_trajectory(&Trajectory::new()).is_err());
        let truncated = trajectory(vec![vec![0.5, 0.5]; 3]);
        assert!(analyze_trajectory(&truncated).is_err());
    }
}
