use std::path::PathBuf;

use clap::Parser;

use fluxcore::AllocationMode;

use crate::common::timeutils::ArgDuration;
use crate::output::outputs::Outputs;

#[derive(clap::ValueEnum, Clone)]
pub enum ColorPolicy {
    /// Use colors if the stdout is detected to be a terminal.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Every client requests resources in the same global order
    #[value(alias = "0")]
    Ordered,
    /// Every client takes its whole set at once or backs off and retries
    #[value(alias = "1")]
    AllOrNothing,
}

impl From<ModeArg> for AllocationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ordered => AllocationMode::Ordered,
            ModeArg::AllOrNothing => AllocationMode::AllOrNothing,
        }
    }
}

// Options of a simulation run
//
// Every option can also be set in the configuration file; the command line wins.
#[derive(Parser, Default)]
pub struct SimulationOpts {
    /// Lower bound of the number of clients that visit the café
    #[arg(long)]
    pub clients_min: Option<u32>,

    /// Upper bound of the number of clients that visit the café
    #[arg(long)]
    pub clients_max: Option<u32>,

    /// How many hours the café is open
    #[arg(long, alias = "hours")]
    pub open_hours: Option<u32>,

    /// Real duration of one simulated hour
    #[arg(long)]
    pub hour_length: Option<ArgDuration>,

    /// Allocation policy used by all clients
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Narration level (0 = summary only, 1 = every client)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub verbose: Option<u8>,

    /// How long a client waits for a compute slot before leaving
    #[arg(long)]
    pub gate_timeout: Option<ArgDuration>,

    /// Pause between two attempts of the all-or-nothing policy
    #[arg(long)]
    pub backoff: Option<ArgDuration>,

    /// Shortest time a client spends using its resources
    #[arg(long)]
    pub service_min: Option<ArgDuration>,

    /// Longest time a client spends using its resources
    #[arg(long)]
    pub service_max: Option<ArgDuration>,

    /// Number of compute slots
    #[arg(long)]
    pub compute_slots: Option<u32>,

    /// Number of seats
    #[arg(long)]
    pub seats: Option<u32>,

    /// Number of VR headsets
    #[arg(long)]
    pub headsets: Option<u32>,

    /// Warn when an arriving client finds every pool almost empty
    #[arg(long, alias = "force-deadlock")]
    pub near_deadlock_alerts: bool,

    /// Seed of the random generator, makes the client mix reproducible
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a TOML file with simulation options
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

// Common CLI options
#[derive(Parser)]
pub struct CommonOpts {
    /// Sets console color policy
    #[arg(
        long,
        default_value_t = ColorPolicy::Auto,
        value_enum,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub colors: ColorPolicy,

    /// Sets output formatting
    #[arg(
        long,
        env = "CYBERFLUX_OUTPUT_MODE",
        default_value_t = Outputs::CLI,
        value_enum,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub output_mode: Outputs,

    /// Enables more detailed log output
    #[arg(
        long,
        env = "CYBERFLUX_DEBUG",
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub debug: bool,
}

// Root CLI options
#[derive(Parser)]
#[command(
    author,
    about,
    version(crate::CYBERFLUX_VERSION),
    help_expected(true)
)]
pub struct RootOptions {
    #[clap(flatten)]
    pub common: CommonOpts,

    #[clap(flatten)]
    pub simulation: SimulationOpts,
}
