//! Run command implementation.

use super::output::format_report_text;
use super::{CliError, OutputFormat};
use std::path::PathBuf;
use wingman::scenario::Scenario;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or built.
pub(crate) fn execute(
    scenario_path: PathBuf,
    seed: Option<u64>,
    ticks: Option<u64>,
    format: OutputFormat,
    events: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let scenario = Scenario::load(&scenario_path)?;
    let seed = seed.unwrap_or(scenario.config.seed);
    let ticks = ticks.unwrap_or(scenario.ticks);
    let name = scenario_path
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !quiet && format == OutputFormat::Text {
        println!("Running {name} with seed {seed} for {ticks} ticks...");
        println!();
    }

    let mut sim = scenario.build_with_seed(seed)?;
    for _ in 0..ticks {
        sim.tick();
        // The log is drained every tick so long runs stay bounded.
        let drained = sim.world_mut().events.drain();
        if events {
            for event in drained {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    let report = sim.report();

    match format {
        OutputFormat::Text => print!("{}", format_report_text(&report, &name)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
