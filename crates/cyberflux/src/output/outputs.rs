use crate::arrival::RunReport;
use crate::config::RunConfig;

#[allow(clippy::upper_case_acronyms)]
#[derive(clap::ValueEnum, Clone)]
pub enum Outputs {
    CLI,
    JSON,
    Quiet,
}

pub trait Output {
    fn print_parameters(&self, config: &RunConfig);
    fn print_report(&self, config: &RunConfig, report: &RunReport);

    fn print_error(&self, error: anyhow::Error);
}
