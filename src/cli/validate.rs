//! Scenario validation command implementation.

use super::CliError;
use std::path::PathBuf;
use wingman::scenario::Scenario;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the scenario is malformed or a profile fails to load.
pub(crate) fn execute(scenario_path: PathBuf) -> Result<(), CliError> {
    println!("Validating: {}", scenario_path.display());
    println!();

    let scenario = match Scenario::load(&scenario_path) {
        Ok(scenario) => {
            print_check("Scenario parses", true);
            scenario
        }
        Err(e) => {
            print_check("Scenario parses", false);
            return Err(e.into());
        }
    };

    let validation = match scenario.validate() {
        Ok(validation) => {
            print_check("Catalog, factions and loadouts", true);
            validation
        }
        Err(e) => {
            print_check("Catalog, factions and loadouts", false);
            return Err(e.into());
        }
    };

    for name in &validation.profiles {
        print_check(&format!("Profile '{name}'"), true);
    }
    for error in &validation.profile_errors {
        print_check(&error.to_string(), false);
    }

    println!();
    println!("Summary:");
    println!("  Hulls:     {}", validation.hulls);
    println!("  Outfits:   {}", validation.outfits);
    println!("  Profiles:  {}", validation.profiles.len());
    println!("  Spawns:    {}", validation.spawns);
    println!();

    if !validation.is_ok() {
        return Err(CliError::new(format!(
            "{} profile(s) failed to load",
            validation.profile_errors.len()
        )));
    }

    println!("Validation successful!");
    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
