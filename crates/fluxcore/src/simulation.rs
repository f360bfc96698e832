use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::client::{ClientId, ClientKind, ClientRequest};
use crate::common::IdCounter;
use crate::config::SimulationConfig;
use crate::events::SimulationObserver;
use crate::policy::AllocationOutcome;
use crate::resources::ResourcePools;
use crate::stats::{SimulationStats, StatsAggregator};
use crate::task::ClientTask;

/// State shared by all client tasks of one run.
pub struct SimulationContext {
    pub config: SimulationConfig,
    pub pools: ResourcePools,
    pub stats: StatsAggregator,
    pub observer: Arc<dyn SimulationObserver>,
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    /// Number of client tasks that were spawned
    pub created: u64,
    pub stats: SimulationStats,
}

/// Owns the shared state of a run and the spawned client tasks.
pub struct Simulation {
    context: Arc<SimulationContext>,
    id_counter: IdCounter,
    tasks: JoinSet<AllocationOutcome>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, observer: Arc<dyn SimulationObserver>) -> crate::Result<Self> {
        config.validate()?;
        let pools = ResourcePools::new(&config.capacities);
        Ok(Simulation {
            context: Arc::new(SimulationContext {
                config,
                pools,
                stats: StatsAggregator::new(),
                observer,
            }),
            id_counter: IdCounter::default(),
            tasks: JoinSet::new(),
        })
    }

    /// Spawns a client arriving now. Has to be called from within a tokio runtime.
    pub fn spawn_client(&mut self, kind: ClientKind, service_time: Duration) -> ClientId {
        let id = ClientId::new(self.id_counter.next());
        let request = ClientRequest::new(id, kind, Instant::now());
        let task = ClientTask::new(request, service_time, self.context.clone());
        self.tasks.spawn(task.run());
        log::debug!("Client {id} ({kind}) arrived");
        id
    }

    /// Number of clients spawned so far.
    pub fn created(&self) -> u64 {
        self.id_counter.issued() as u64
    }

    pub fn pools(&self) -> &ResourcePools {
        &self.context.pools
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.context.stats
    }

    /// Waits for every spawned client and returns the final statistics.
    pub async fn finish(mut self) -> SimulationSummary {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(error) = result {
                log::error!("Client task failed: {error}");
            }
        }
        debug_assert!(self.context.pools.is_idle());
        SimulationSummary {
            created: self.created(),
            stats: self.context.stats.snapshot(),
        }
    }
}
