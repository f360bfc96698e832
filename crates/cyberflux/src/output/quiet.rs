use crate::arrival::RunReport;
use crate::config::RunConfig;
use crate::output::outputs::Output;

/// Prints only the final counters on a single line:
/// `<created> <served> <abandoned> <average wait in ms>`.
#[derive(Default)]
pub struct Quiet;

impl Output for Quiet {
    fn print_parameters(&self, _config: &RunConfig) {}

    fn print_report(&self, _config: &RunConfig, report: &RunReport) {
        let stats = &report.summary.stats;
        println!(
            "{} {} {} {:.2}",
            report.summary.created,
            stats.total_served,
            stats.total_abandoned,
            stats.average_wait_ms()
        );
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("{error:?}");
    }
}
