use crate::analysis::analyze_trajectory;
use crate::config::Config;
use crate::engine::{Engine, Summary};
use crate::model::Choice;
use anyhow::{Context, Result};
use glob::glob;
use rmp_serde::{decode, encode};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Play a run and hand its summary over in `summary.msgpack`.
    ///
    /// `seed` takes precedence over the configured seed.
    pub fn run_simulation(&self, seed: Option<u64>) -> Result<()> {
        let seed = seed.or(self.cfg.game.seed);
        match seed {
            Some(seed) => log::info!("seeding rng with {seed}"),
            None => log::info!("seeding rng from OS entropy"),
        }

        let engine =
            Engine::from_seed(self.cfg.clone(), seed).context("failed to construct engine")?;
        let summary = engine.run().context("failed to run simulation")?;

        log_summary(&summary);

        write_file(self.summary_file(), &summary).context("failed to save summary")?;

        Ok(())
    }

    /// Measure the convergence of the last run's strategy.
    pub fn analyze_simulation(&self) -> Result<()> {
        let file = self.summary_file();
        let summary: Summary =
            read_file(&file).with_context(|| format!("failed to load {file:?}"))?;

        let report =
            analyze_trajectory(&summary.trajectory).context("failed to analyze trajectory")?;
        log::info!("{report:#?}");

        write_file(self.analysis_file(), &report).context("failed to save analysis")?;

        Ok(())
    }

    /// Remove every output file, keeping the config.
    pub fn clean_simulation(&self) -> Result<()> {
        let pattern = self.sim_dir.join("*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for file in glob(pattern)
            .context("failed to glob output files")?
            .filter_map(|entry| entry.ok())
        {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    fn summary_file(&self) -> PathBuf {
        self.sim_dir.join("summary.msgpack")
    }

    fn analysis_file(&self) -> PathBuf {
        self.sim_dir.join("analysis.msgpack")
    }
}

fn log_summary(summary: &Summary) {
    let outcome = &summary.outcome;
    log::info!("scores {:?}", outcome.scores);
    log::info!("counts {:?}", outcome.counts);
    log::info!("choices {:?}", outcome.choices);
    for (choice, prob) in Choice::ALL.iter().zip(&summary.probs) {
        log::info!("prob {:<10} {prob:.6}", choice.name());
    }
    log::info!("mean score {:.4}", summary.mean_score);
}

fn write_file<P: AsRef<Path>, T: Serialize>(file: P, value: &T) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write_named(&mut writer, value).context("failed to serialize value")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

fn read_file<P: AsRef<Path>, T: serde::de::DeserializeOwned>(file: P) -> Result<T> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let value = decode::from_read(&mut reader).context("failed to deserialize value")?;
    Ok(value)
}
