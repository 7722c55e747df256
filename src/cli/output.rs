//! Output formatting utilities for CLI.

use serde::Serialize;
use std::fmt::Write;
use wingman::sim::SimReport;

/// Format a single run's report as human-readable text.
pub(super) fn format_report_text(report: &SimReport, name: &str) -> String {
    let mut output = String::new();
    let events = &report.events;

    let _ = writeln!(output, "Scenario {name} (seed: {})", report.seed);
    let _ = writeln!(output, "  Ticks: {} ({:.1}s simulated)", report.ticks, report.time);
    let _ = writeln!(output, "  Actors remaining: {}", report.actors);
    let _ = writeln!(
        output,
        "  Player: {} (rating {:.1})",
        if report.player_alive { "alive" } else { "lost" },
        report.player_rating
    );
    output.push('\n');
    let _ = writeln!(output, "  Shots fired:   {}", events.shots);
    let _ = writeln!(output, "  Disabled:      {}", events.disabled);
    let _ = writeln!(output, "  Destroyed:     {}", events.destroyed);
    let _ = writeln!(output, "  Boarded:       {}", events.boarded);
    let _ = writeln!(output, "  Jumped out:    {}", events.jumped);
    let _ = writeln!(output, "  Escorts out:   {} (docked {})", events.launched, events.docked);
    let _ = writeln!(output, "  Distress:      {}", events.distress);
    let _ = writeln!(output, "  Messages:      {}", events.messages);
    output.push('\n');
    let _ = writeln!(output, "  Routine faults: {}", report.faults);
    if report.violations > 0 {
        let _ = writeln!(output, "  Invariant violations: {}", report.violations);
    }

    output
}

/// Aggregated statistics over many runs.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Runs completed.
    pub(super) runs: u64,
    /// Runs that failed to build.
    pub(super) failed: u64,
    /// Runs the player survived.
    pub(super) player_survived: u64,
    /// Per-run reports, in completion order.
    pub(super) reports: Vec<SimReport>,
    total_destroyed: u64,
    destroyed_sq_sum: f64,
    total_faults: u64,
    total_shots: u64,
}

impl BatchStats {
    /// Add a finished run.
    pub(super) fn add_report(&mut self, report: SimReport) {
        self.runs += 1;
        if report.player_alive {
            self.player_survived += 1;
        }
        let destroyed = report.events.destroyed;
        self.total_destroyed += destroyed;
        self.destroyed_sq_sum += (destroyed * destroyed) as f64;
        self.total_faults += report.faults;
        self.total_shots += report.events.shots;
        self.reports.push(report);
    }

    /// Count a run that could not be built.
    pub(super) fn add_failure(&mut self) {
        self.failed += 1;
    }

    /// Merge another thread's stats into these.
    pub(super) fn merge(&mut self, other: Self) {
        self.runs += other.runs;
        self.failed += other.failed;
        self.player_survived += other.player_survived;
        self.total_destroyed += other.total_destroyed;
        self.destroyed_sq_sum += other.destroyed_sq_sum;
        self.total_faults += other.total_faults;
        self.total_shots += other.total_shots;
        self.reports.extend(other.reports);
    }

    /// Fraction of runs the player survived (0.0-1.0).
    pub(super) fn survival_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.player_survived as f64 / self.runs as f64
    }

    /// Mean actors destroyed per run.
    pub(super) fn avg_destroyed(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_destroyed as f64 / self.runs as f64
    }

    /// Standard deviation of actors destroyed per run.
    pub(super) fn destroyed_std_dev(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        let mean = self.avg_destroyed();
        let variance = self.destroyed_sq_sum / self.runs as f64 - mean * mean;
        variance.max(0.0).sqrt()
    }

    /// Mean shots per run.
    pub(super) fn avg_shots(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_shots as f64 / self.runs as f64
    }

    /// Routine faults across all runs.
    pub(super) fn total_faults(&self) -> u64 {
        self.total_faults
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult<'a> {
    runs: u64,
    failed: u64,
    survival_rate: f64,
    avg_destroyed: f64,
    destroyed_std_dev: f64,
    avg_shots: f64,
    faults: u64,
    reports: &'a [SimReport],
}

impl<'a> JsonBatchResult<'a> {
    /// Create from stats.
    pub(super) fn from_stats(stats: &'a BatchStats) -> Self {
        Self {
            runs: stats.runs,
            failed: stats.failed,
            survival_rate: stats.survival_rate(),
            avg_destroyed: stats.avg_destroyed(),
            destroyed_std_dev: stats.destroyed_std_dev(),
            avg_shots: stats.avg_shots(),
            faults: stats.total_faults(),
            reports: &stats.reports,
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} runs)", stats.runs);
    output.push_str("========================================\n\n");
    if stats.failed > 0 {
        let _ = writeln!(output, "  Failed to build: {}", stats.failed);
    }
    let _ = writeln!(
        output,
        "  Player survival: {:.1}% ({} runs)",
        stats.survival_rate() * 100.0,
        stats.player_survived
    );
    let _ = writeln!(
        output,
        "  Destroyed per run: {:.1} (+/- {:.1})",
        stats.avg_destroyed(),
        stats.destroyed_std_dev()
    );
    let _ = writeln!(output, "  Shots per run: {:.0}", stats.avg_shots());
    let _ = writeln!(output, "  Routine faults: {}", stats.total_faults());

    output
}

/// Format batch stats as CSV, one row per run ordered by seed.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str("seed,ticks,actors,player_alive,destroyed,disabled,jumped,shots,faults\n");

    let mut reports: Vec<&SimReport> = stats.reports.iter().collect();
    reports.sort_by_key(|r| r.seed);
    for r in reports {
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{},{},{}",
            r.seed,
            r.ticks,
            r.actors,
            r.player_alive,
            r.events.destroyed,
            r.events.disabled,
            r.events.jumped,
            r.events.shots,
            r.faults
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman::sim::EventTally;

    fn report(seed: u64, destroyed: u64, player_alive: bool) -> SimReport {
        SimReport {
            seed,
            ticks: 100,
            time: 100.0 / 60.0,
            actors: 3,
            player_alive,
            player_rating: 0.0,
            faults: 1,
            violations: 0,
            events: EventTally { destroyed, shots: 10, ..EventTally::default() },
        }
    }

    #[test]
    fn test_batch_stats_merge() {
        let mut a = BatchStats::default();
        a.add_report(report(1, 2, true));
        let mut b = BatchStats::default();
        b.add_report(report(2, 4, false));
        b.add_failure();
        a.merge(b);

        assert_eq!(a.runs, 2);
        assert_eq!(a.failed, 1);
        assert!((a.survival_rate() - 0.5).abs() < 1e-9);
        assert!((a.avg_destroyed() - 3.0).abs() < 1e-9);
        assert!((a.destroyed_std_dev() - 1.0).abs() < 1e-9);
        assert_eq!(a.total_faults(), 2);
    }

    #[test]
    fn test_csv_sorted_by_seed() {
        let mut stats = BatchStats::default();
        stats.add_report(report(9, 0, true));
        stats.add_report(report(3, 1, true));
        let csv = format_batch_csv(&stats);
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("3,"));
        assert!(rows[2].starts_with("9,"));
    }

    #[test]
    fn test_report_text_mentions_player() {
        let text = format_report_text(&report(5, 1, false), "demo");
        assert!(text.contains("seed: 5"));
        assert!(text.contains("lost"));
    }
}
