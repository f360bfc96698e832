use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};

use fluxcore::events::SimulationObserver;
use fluxcore::{ClientKind, Simulation, SimulationSummary};

use crate::common::error::CyberfluxError;
use crate::config::RunConfig;

/// Period of the arrival generator.
pub const ARRIVAL_TICK: Duration = Duration::from_millis(200);

/// Largest group of clients that enters during a single tick.
pub const MAX_GROUP_SIZE: u32 = 2;

/// The café is open at least this long, whatever the hour length.
pub const MIN_OPEN_WINDOW: Duration = Duration::from_secs(1);

/// Inclusive range of service times.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceTimeRange {
    min: Duration,
    max: Duration,
}

impl ServiceTimeRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArrivalConfig {
    pub clients_min: u32,
    pub clients_max: u32,
    pub open_hours: u32,
    pub hour_length: Duration,
    pub service_time: ServiceTimeRange,
    pub seed: Option<u64>,
}

impl ArrivalConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.hour_length.is_zero() {
            return Err(CyberfluxError::InvalidConfiguration(
                "hour length cannot be zero".to_string(),
            ));
        }
        if self.service_time.min > self.service_time.max {
            return Err(CyberfluxError::InvalidConfiguration(format!(
                "minimal service time ({}) is longer than maximal service time ({})",
                humantime::format_duration(self.service_time.min),
                humantime::format_duration(self.service_time.max)
            )));
        }
        Ok(())
    }

    /// For how long new clients can enter the café.
    pub fn open_window(&self) -> Duration {
        self.hour_length
            .saturating_mul(self.open_hours)
            .max(MIN_OPEN_WINDOW)
    }

    /// Number of clients that would like to visit the café.
    ///
    /// Uniform in `[clients_min, clients_max]`; `clients_min` when the bounds are swapped.
    pub fn sample_client_count<R: Rng>(&self, rng: &mut R) -> u32 {
        if self.clients_min >= self.clients_max {
            self.clients_min
        } else {
            rng.random_range(self.clients_min..=self.clients_max)
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// How many clients wanted to come
    pub planned: u32,
    pub summary: SimulationSummary,
    /// Real time from opening until the last client left
    pub duration: Duration,
}

pub fn create_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

/// Lets clients in while the café is open.
///
/// Every tick a group of up to [`MAX_GROUP_SIZE`] clients of random kinds
/// arrives. Clients that did not make it before closing never enter.
/// Returns the number of planned clients.
pub async fn run_arrivals<R: Rng>(
    simulation: &mut Simulation,
    config: &ArrivalConfig,
    rng: &mut R,
) -> u32 {
    let planned = config.sample_client_count(rng);
    let window = config.open_window();
    log::debug!(
        "Café opens for {}, expecting {planned} client(s)",
        humantime::format_duration(window)
    );

    let opened = Instant::now();
    let mut interval = tokio::time::interval(ARRIVAL_TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while (simulation.created() as u32) < planned {
        interval.tick().await;
        if opened.elapsed() >= window {
            log::debug!(
                "Café closed, {} of {planned} client(s) entered",
                simulation.created()
            );
            break;
        }
        let group_size = rng.random_range(0..=MAX_GROUP_SIZE);
        for _ in 0..group_size {
            if simulation.created() as u32 >= planned {
                break;
            }
            let kind: ClientKind = rng.random();
            simulation.spawn_client(kind, config.service_time.sample(rng));
        }
    }
    planned
}

/// Runs a complete simulation: opens the café, lets clients in and waits
/// until everybody who entered has left.
pub async fn run_simulation(
    config: &RunConfig,
    observer: Arc<dyn SimulationObserver>,
) -> crate::Result<RunReport> {
    let mut simulation = Simulation::new(config.simulation.clone(), observer)?;
    let mut rng = create_rng(config.arrival.seed);

    let start = Instant::now();
    let planned = run_arrivals(&mut simulation, &config.arrival, &mut rng).await;
    log::debug!("Waiting for {} client(s) to leave", simulation.created());
    let summary = simulation.finish().await;

    Ok(RunReport {
        planned,
        summary,
        duration: start.elapsed(),
    })
}
