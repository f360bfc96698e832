use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::client::ClientKind;
use crate::resources::{ResourceCounts, ResourceSet};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientKindCounts {
    pub gamer: u64,
    pub freelancer: u64,
    pub student: u64,
}

impl ClientKindCounts {
    pub fn get(&self, kind: ClientKind) -> u64 {
        match kind {
            ClientKind::Gamer => self.gamer,
            ClientKind::Freelancer => self.freelancer,
            ClientKind::Student => self.student,
        }
    }

    fn increment(&mut self, kind: ClientKind) {
        match kind {
            ClientKind::Gamer => self.gamer += 1,
            ClientKind::Freelancer => self.freelancer += 1,
            ClientKind::Student => self.student += 1,
        }
    }
}

/// Aggregated outcome of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub total_served: u64,
    pub total_abandoned: u64,
    pub total_wait_time: Duration,
    /// How many times each resource kind was held by a served client
    pub resource_usage: ResourceCounts,
    pub served_by_kind: ClientKindCounts,
    pub abandoned_by_kind: ClientKindCounts,
}

impl SimulationStats {
    pub fn total_finished(&self) -> u64 {
        self.total_served + self.total_abandoned
    }

    /// Average wait of served clients, zero when nobody was served.
    pub fn average_wait(&self) -> Duration {
        if self.total_served == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_wait_time.as_nanos() / self.total_served as u128;
        Duration::from_nanos(nanos as u64)
    }

    pub fn average_wait_ms(&self) -> f64 {
        self.average_wait().as_secs_f64() * 1000.0
    }
}

/// Run statistics shared by all client tasks.
///
/// Every record operation takes the internal lock once, so concurrent updates
/// are never lost and a snapshot never observes a half-applied record.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Mutex<SimulationStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_served(&self, wait: Duration, resources: ResourceSet, client: ClientKind) {
        let mut stats = self.lock();
        stats.total_served += 1;
        stats.total_wait_time += wait;
        stats.resource_usage.add_set(resources);
        stats.served_by_kind.increment(client);
    }

    pub fn record_abandoned(&self, client: ClientKind) {
        let mut stats = self.lock();
        stats.total_abandoned += 1;
        stats.abandoned_by_kind.increment(client);
    }

    pub fn snapshot(&self) -> SimulationStats {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimulationStats> {
        // Records are applied field by field without panicking in between
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
