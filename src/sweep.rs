//! Parameter sweeps: many independent runs described by one YAML file.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crate::analysis::{RunReport, RunSummary, summarize};
use crate::config::{ConfigOverrides, SimulationConfig, standard_config};
use crate::error::Result;
use crate::simulation::Simulation;

/// A named batch of runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepBatch {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parallel: Option<usize>,
    pub runs: Vec<SweepRun>,
}

/// One entry of a batch. The base configuration comes from `preset`, else
/// `config_file`, else the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRun {
    pub name: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    #[serde(default)]
    pub overrides: ConfigOverrides,
    /// Number of repetitions; the seed is offset by the repetition index.
    #[serde(default)]
    pub repeat: usize,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    pub name: String,
    pub seed: Option<u64>,
    pub success: bool,
    pub error: Option<String>,
    pub summary: Option<RunSummary>,
    pub duration_ms: u64,
}

impl SweepBatch {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Every (run, repetition) pair in batch order.
    fn jobs(&self) -> Vec<(&SweepRun, usize)> {
        self.runs
            .iter()
            .flat_map(|run| (0..run.repeat.max(1)).map(move |k| (run, k)))
            .collect()
    }

    /// Execute every run. Failures are reported per run and do not stop the
    /// batch. With `parallel > 1`, that many runs execute at once; each run
    /// is still a single-threaded simulation.
    pub fn run(&self) -> Vec<SweepResult> {
        let jobs = self.jobs();
        let parallel = self.parallel.unwrap_or(1).max(1);
        info!(
            "Sweep '{}': {} runs, {} at a time",
            self.name,
            jobs.len(),
            parallel
        );

        if parallel == 1 {
            return jobs.iter().map(|(run, k)| run_single(run, *k)).collect();
        }

        let mut results = Vec::with_capacity(jobs.len());
        for chunk in jobs.chunks(parallel) {
            let chunk_results: Vec<SweepResult> = thread::scope(|s| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|(run, k)| s.spawn(move || run_single(run, *k)))
                    .collect();
                handles
                    .into_iter()
                    .zip(chunk)
                    .map(|(handle, (run, k))| {
                        handle.join().unwrap_or_else(|_| SweepResult {
                            name: run_name(run, *k),
                            seed: None,
                            success: false,
                            error: Some("simulation thread panicked".to_string()),
                            summary: None,
                            duration_ms: 0,
                        })
                    })
                    .collect()
            });
            results.extend(chunk_results);
        }
        results
    }
}

fn run_name(run: &SweepRun, repetition: usize) -> String {
    if run.repeat > 1 {
        format!("{}#{}", run.name, repetition)
    } else {
        run.name.clone()
    }
}

/// Base configuration with overrides applied and the seed offset for
/// `repetition`.
pub fn resolve_config(run: &SweepRun, repetition: usize) -> Result<SimulationConfig> {
    let mut config = match (&run.preset, &run.config_file) {
        (Some(preset), _) => standard_config(preset)?,
        (None, Some(path)) => SimulationConfig::load_from_file(path)?,
        (None, None) => SimulationConfig::default(),
    };
    run.overrides.apply(&mut config);
    config.name = run_name(run, repetition);
    if let Some(seed) = config.random_seed {
        config.random_seed = Some(seed.wrapping_add(repetition as u64));
    }
    Ok(config)
}

fn output_path(run: &SweepRun, repetition: usize) -> Option<PathBuf> {
    let path = run.output.as_ref()?;
    if run.repeat <= 1 {
        return Some(path.clone());
    }
    let stem = path.file_stem()?.to_string_lossy();
    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, repetition, ext.to_string_lossy()),
        None => format!("{}_{}", stem, repetition),
    };
    Some(path.with_file_name(file_name))
}

fn run_single(run: &SweepRun, repetition: usize) -> SweepResult {
    let start = Instant::now();
    let name = run_name(run, repetition);

    let outcome = resolve_config(run, repetition).and_then(|config| {
        let seed = config.random_seed;
        let mut sim = Simulation::new(config)?;
        sim.run()?;
        let report = RunReport::from_simulation(&sim);
        if let Some(path) = output_path(run, repetition) {
            report.save_to_file(&path)?;
        }
        Ok((seed, summarize(&report)))
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok((seed, summary)) => SweepResult {
            name,
            seed,
            success: true,
            error: None,
            summary: Some(summary),
            duration_ms,
        },
        Err(e) => {
            warn!("Sweep run {} failed: {}", name, e);
            SweepResult {
                name,
                seed: None,
                success: false,
                error: Some(e.to_string()),
                summary: None,
                duration_ms,
            }
        }
    }
}

impl fmt::Display for SweepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.summary, &self.error) {
            (Some(summary), _) => write!(
                f,
                "{:<24} Gini {:.3} -> {:.3}  avg wealth {:.2}  in debt {:>4}  ({} ms)",
                self.name,
                summary.initial_gini,
                summary.final_gini,
                summary.final_average_wealth,
                summary.agents_in_debt,
                self.duration_ms
            ),
            (None, Some(error)) => write!(f, "{:<24} FAILED: {}", self.name, error),
            (None, None) => write!(f, "{:<24} no result", self.name),
        }
    }
}
