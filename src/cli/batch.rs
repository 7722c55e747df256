//! Batch command implementation: many seeds of one scenario in parallel.

use super::output::{BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use wingman::scenario::Scenario;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or does not validate.
pub(crate) fn execute(
    scenario_path: PathBuf,
    runs: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    ticks: Option<u64>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let scenario = Scenario::load(&scenario_path)?;
    // Fail fast on structural errors instead of once per run.
    scenario.validate()?;

    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed.unwrap_or(scenario.config.seed);
    let ticks = ticks.unwrap_or(scenario.ticks);

    let pb = progress.then(|| {
        let pb = ProgressBar::new(runs);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb
    });

    let start = Instant::now();

    // Each thread accumulates its own stats; the script engine is built and
    // dropped inside the run, so nothing crosses threads but reports.
    let stats = (0..runs)
        .into_par_iter()
        .fold(BatchStats::default, |mut local, i| {
            match scenario.build_with_seed(base_seed.wrapping_add(i)) {
                Ok(mut sim) => {
                    for _ in 0..ticks {
                        sim.tick();
                        sim.world_mut().events.drain();
                    }
                    local.add_report(sim.report());
                }
                Err(_) => local.add_failure(),
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(BatchStats::default, |mut a, b| {
            a.merge(b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let runs_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.runs as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!("Duration: {:.2}s ({runs_per_sec:.1} runs/sec)", duration.as_secs_f64());
        }
        BatchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats))?;
            println!("{json}");
        }
        BatchFormat::Csv => print!("{}", format_batch_csv(&stats)),
    }

    Ok(())
}
