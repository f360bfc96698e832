use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use fluxcore::AllocationMode;
use fluxcore::config::{DEFAULT_BACKOFF, DEFAULT_GATE_TIMEOUT, PoolCapacities, SimulationConfig};

use crate::arrival::{ArrivalConfig, ServiceTimeRange};
use crate::common::cli::SimulationOpts;
use crate::common::error::CyberfluxError;
use crate::common::timeutils::deserialize_human_duration_opt;

pub const DEFAULT_CLIENTS_MIN: u32 = 20;
pub const DEFAULT_CLIENTS_MAX: u32 = 120;
pub const DEFAULT_OPEN_HOURS: u32 = 8;
pub const DEFAULT_HOUR_LENGTH: Duration = Duration::from_secs(3);
pub const DEFAULT_SERVICE_MIN: Duration = Duration::from_secs(1);
pub const DEFAULT_SERVICE_MAX: Duration = Duration::from_secs(5);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Only the parameters and the final report
    #[default]
    Summary,
    /// Every arrival, service and departure is narrated
    Narrate,
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        if level == 0 {
            Verbosity::Summary
        } else {
            Verbosity::Narrate
        }
    }
}

/// Contents of a configuration file.
///
/// Keys are the same as the command line options, e.g.
/// ```toml
/// clients-max = 40
/// mode = "all-or-nothing"
/// gate-timeout = "2s"
/// ```
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub clients_min: Option<u32>,
    pub clients_max: Option<u32>,
    pub open_hours: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_human_duration_opt")]
    pub hour_length: Option<Duration>,
    pub mode: Option<AllocationMode>,
    pub verbose: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_human_duration_opt")]
    pub gate_timeout: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_human_duration_opt")]
    pub backoff: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_human_duration_opt")]
    pub service_min: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_human_duration_opt")]
    pub service_max: Option<Duration>,
    pub compute_slots: Option<u32>,
    pub seats: Option<u32>,
    pub headsets: Option<u32>,
    pub near_deadlock_alerts: Option<bool>,
    pub seed: Option<u64>,
}

impl FileConfig {
    pub fn parse(str: &str) -> crate::Result<FileConfig> {
        Ok(toml::from_str(str)?)
    }

    pub fn load(path: &Path) -> crate::Result<FileConfig> {
        let content =
            std::fs::read_to_string(path).map_err(|source| CyberfluxError::ConfigFileError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&content)
    }
}

/// Everything needed to run one simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub arrival: ArrivalConfig,
    pub verbosity: Verbosity,
}

impl RunConfig {
    /// Builds the configuration from the command line, reading the configuration
    /// file when one was passed.
    pub fn from_opts(opts: SimulationOpts) -> crate::Result<RunConfig> {
        let file = match &opts.config {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };
        Self::merge(opts, file)
    }

    /// Command line options take precedence over the configuration file,
    /// the file takes precedence over defaults.
    pub fn merge(opts: SimulationOpts, file: FileConfig) -> crate::Result<RunConfig> {
        let capacities = PoolCapacities {
            compute_slots: opts
                .compute_slots
                .or(file.compute_slots)
                .unwrap_or(PoolCapacities::default().compute_slots),
            seats: opts
                .seats
                .or(file.seats)
                .unwrap_or(PoolCapacities::default().seats),
            headsets: opts
                .headsets
                .or(file.headsets)
                .unwrap_or(PoolCapacities::default().headsets),
        };
        let simulation = SimulationConfig {
            mode: opts
                .mode
                .map(AllocationMode::from)
                .or(file.mode)
                .unwrap_or_default(),
            capacities,
            gate_timeout: opts
                .gate_timeout
                .map(|d| d.unpack())
                .or(file.gate_timeout)
                .unwrap_or(DEFAULT_GATE_TIMEOUT),
            backoff: opts
                .backoff
                .map(|d| d.unpack())
                .or(file.backoff)
                .unwrap_or(DEFAULT_BACKOFF),
            near_deadlock_alerts: opts.near_deadlock_alerts
                || file.near_deadlock_alerts.unwrap_or(false),
        };
        let arrival = ArrivalConfig {
            clients_min: opts
                .clients_min
                .or(file.clients_min)
                .unwrap_or(DEFAULT_CLIENTS_MIN),
            clients_max: opts
                .clients_max
                .or(file.clients_max)
                .unwrap_or(DEFAULT_CLIENTS_MAX),
            open_hours: opts
                .open_hours
                .or(file.open_hours)
                .unwrap_or(DEFAULT_OPEN_HOURS),
            hour_length: opts
                .hour_length
                .map(|d| d.unpack())
                .or(file.hour_length)
                .unwrap_or(DEFAULT_HOUR_LENGTH),
            service_time: ServiceTimeRange::new(
                opts.service_min
                    .map(|d| d.unpack())
                    .or(file.service_min)
                    .unwrap_or(DEFAULT_SERVICE_MIN),
                opts.service_max
                    .map(|d| d.unpack())
                    .or(file.service_max)
                    .unwrap_or(DEFAULT_SERVICE_MAX),
            ),
            seed: opts.seed.or(file.seed),
        };
        let verbosity = match opts.verbose.or(file.verbose) {
            Some(level) if level > 1 => {
                return Err(CyberfluxError::InvalidConfiguration(format!(
                    "verbosity has to be 0 or 1, not {level}"
                )));
            }
            level => Verbosity::from(level.unwrap_or(0)),
        };

        let config = RunConfig {
            simulation,
            arrival,
            verbosity,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.simulation.validate()?;
        self.arrival.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use fluxcore::AllocationMode;

    use crate::common::cli::{ModeArg, SimulationOpts};
    use crate::common::error::CyberfluxError;
    use crate::common::timeutils::ArgDuration;
    use crate::config::{FileConfig, RunConfig, Verbosity};

    fn duration(value: &str) -> Option<ArgDuration> {
        Some(value.parse().unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::merge(SimulationOpts::default(), FileConfig::default()).unwrap();
        assert_eq!(config.simulation.mode, AllocationMode::Ordered);
        assert_eq!(config.simulation.gate_timeout, Duration::from_millis(1500));
        assert_eq!(config.simulation.backoff, Duration::from_millis(50));
        assert_eq!(config.simulation.capacities.compute_slots, 10);
        assert_eq!(config.simulation.capacities.seats, 8);
        assert_eq!(config.simulation.capacities.headsets, 6);
        assert!(!config.simulation.near_deadlock_alerts);
        assert_eq!(config.arrival.clients_min, 20);
        assert_eq!(config.arrival.clients_max, 120);
        assert_eq!(config.arrival.open_hours, 8);
        assert_eq!(config.arrival.hour_length, Duration::from_secs(3));
        assert_eq!(config.arrival.service_time.min(), Duration::from_secs(1));
        assert_eq!(config.arrival.service_time.max(), Duration::from_secs(5));
        assert_eq!(config.arrival.seed, None);
        assert_eq!(config.verbosity, Verbosity::Summary);
    }

    #[test]
    fn test_parse_file() {
        let file = FileConfig::parse(
            r#"
clients-min = 4
clients-max = 6
open-hours = 1
hour-length = "200ms"
mode = "all-or-nothing"
verbose = 1
gate-timeout = "2s"
backoff = "10ms"
service-min = "100ms"
service-max = "300ms"
compute-slots = 2
seats = 1
headsets = 1
near-deadlock-alerts = true
seed = 7
"#,
        )
        .unwrap();
        let config = RunConfig::merge(SimulationOpts::default(), file).unwrap();
        assert_eq!(config.simulation.mode, AllocationMode::AllOrNothing);
        assert_eq!(config.simulation.gate_timeout, Duration::from_secs(2));
        assert_eq!(config.simulation.backoff, Duration::from_millis(10));
        assert_eq!(config.simulation.capacities.compute_slots, 2);
        assert!(config.simulation.near_deadlock_alerts);
        assert_eq!(config.arrival.clients_min, 4);
        assert_eq!(config.arrival.hour_length, Duration::from_millis(200));
        assert_eq!(config.arrival.service_time.max(), Duration::from_millis(300));
        assert_eq!(config.arrival.seed, Some(7));
        assert_eq!(config.verbosity, Verbosity::Narrate);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let error = FileConfig::parse("clients = 5").unwrap_err();
        assert!(matches!(error, CyberfluxError::DeserializationError(_)));
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        assert!(FileConfig::parse("backoff = \"a while\"").is_err());
    }

    #[test]
    fn test_command_line_overrides_file() {
        let file = FileConfig::parse(
            r#"
mode = "all-or-nothing"
seats = 3
gate-timeout = "2s"
"#,
        )
        .unwrap();
        let opts = SimulationOpts {
            mode: Some(ModeArg::Ordered),
            gate_timeout: duration("100ms"),
            ..Default::default()
        };
        let config = RunConfig::merge(opts, file).unwrap();
        assert_eq!(config.simulation.mode, AllocationMode::Ordered);
        assert_eq!(config.simulation.gate_timeout, Duration::from_millis(100));
        assert_eq!(config.simulation.capacities.seats, 3);
    }

    #[test]
    fn test_invalid_values() {
        let opts = SimulationOpts {
            headsets: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            RunConfig::merge(opts, FileConfig::default()),
            Err(CyberfluxError::SimulationError(_))
        ));

        let opts = SimulationOpts {
            service_min: duration("2s"),
            service_max: duration("1s"),
            ..Default::default()
        };
        assert!(matches!(
            RunConfig::merge(opts, FileConfig::default()),
            Err(CyberfluxError::InvalidConfiguration(_))
        ));

        let opts = SimulationOpts {
            hour_length: duration("0s"),
            ..Default::default()
        };
        assert!(RunConfig::merge(opts, FileConfig::default()).is_err());

        let file = FileConfig {
            verbose: Some(3),
            ..Default::default()
        };
        assert!(RunConfig::merge(SimulationOpts::default(), file).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "clients-max = 3\nclients-min = 3").unwrap();
        let opts = SimulationOpts {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = RunConfig::from_opts(opts).unwrap();
        assert_eq!(config.arrival.clients_min, 3);
        assert_eq!(config.arrival.clients_max, 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let opts = SimulationOpts {
            config: Some(dir.path().join("missing.toml")),
            ..Default::default()
        };
        let error = RunConfig::from_opts(opts).unwrap_err();
        assert!(matches!(
            &error,
            CyberfluxError::ConfigFileError { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(error.to_string().contains("missing.toml"));
    }
}
